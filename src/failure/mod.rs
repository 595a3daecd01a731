//! User-facing descriptors for failed downloads.

use queue_dl_core::FailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureDescriptor {
    pub kind: FailureKind,
    pub what: &'static str,
    pub why: &'static str,
    pub fix: &'static str,
}

impl FailureDescriptor {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self.kind {
            FailureKind::RateLimited => "⏳",
            FailureKind::AgeRestricted => "🔞",
            FailureKind::Unavailable => "🚫",
            FailureKind::Unknown => "⚠️",
        }
    }
}

/// Returns the descriptor for a failure kind.
#[must_use]
pub fn describe_failure(kind: FailureKind) -> FailureDescriptor {
    match kind {
        FailureKind::RateLimited => FailureDescriptor {
            kind,
            what: "Rate limited",
            why: "The site throttled requests after too many downloads in a short time.",
            fix: "Wait a while, then rerun with a larger --retry-delay.",
        },
        FailureKind::AgeRestricted => FailureDescriptor {
            kind,
            what: "Age restricted",
            why: "The media requires a signed-in, age-verified account.",
            fix: "Download it manually or configure yt-dlp cookies for an account that can view it.",
        },
        FailureKind::Unavailable => FailureDescriptor {
            kind,
            what: "Media unavailable",
            why: "The media is private, removed, or the link no longer resolves.",
            fix: "Check the link in a browser and remove it from the queue if it is gone.",
        },
        FailureKind::Unknown => FailureDescriptor {
            kind,
            what: "Unhandled failure",
            why: "The error did not match a known category and needs closer inspection.",
            fix: "Rerun with -v to see yt-dlp's output; failed URLs stay listed in the failure file.",
        },
    }
}

/// Maps a history status code back to its failure kind.
#[must_use]
pub fn kind_from_status_code(status_code: &str) -> Option<FailureKind> {
    match status_code {
        "RATE_LIMIT" => Some(FailureKind::RateLimited),
        "AGE_LIMIT" => Some(FailureKind::AgeRestricted),
        "UNAVAILABLE" => Some(FailureKind::Unavailable),
        "UNKNOWN_ERROR" => Some(FailureKind::Unknown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure_rate_limited() {
        let d = describe_failure(FailureKind::RateLimited);
        assert_eq!(d.kind, FailureKind::RateLimited);
        assert!(d.fix.contains("--retry-delay"));
    }

    #[test]
    fn test_describe_failure_every_kind_is_filled() {
        for kind in [
            FailureKind::RateLimited,
            FailureKind::AgeRestricted,
            FailureKind::Unavailable,
            FailureKind::Unknown,
        ] {
            let d = describe_failure(kind);
            assert!(!d.what.is_empty());
            assert!(!d.why.is_empty());
            assert!(!d.fix.is_empty());
            assert!(!d.icon().is_empty());
        }
    }

    #[test]
    fn test_kind_from_status_code_round_trips_labels() {
        for kind in [
            FailureKind::RateLimited,
            FailureKind::AgeRestricted,
            FailureKind::Unavailable,
            FailureKind::Unknown,
        ] {
            assert_eq!(kind_from_status_code(kind.status_code()), Some(kind));
        }
        assert_eq!(kind_from_status_code("SUCCESS"), None);
    }
}
