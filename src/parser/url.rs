//! URL validation and host filtering for queue entries.

use tracing::trace;
use url::Url;

use super::error::{MAX_URL_LENGTH, ParseError};

/// Validates a URL string and normalizes it.
///
/// # Validation rules:
/// - Must not exceed `MAX_URL_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme (no ftp, file, etc.)
/// - Must have a host (domain or IP)
pub(crate) fn validate_url(raw: &str) -> Result<Url, ParseError> {
    // Check URL length first (prevents memory issues with very long URLs)
    if raw.len() > MAX_URL_LENGTH {
        return Err(ParseError::too_long(raw));
    }

    let parsed = Url::parse(raw).map_err(|e| ParseError::malformed(raw, &e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ParseError::unsupported_scheme(raw, scheme)),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ParseError::no_host(raw));
    }

    trace!(url = %parsed, "URL validated");
    Ok(parsed)
}

/// Returns true when `url`'s host equals one of `allowed` or is a subdomain of it.
///
/// An empty allow list accepts every host. Comparison is case-insensitive and
/// ignores a leading `www.` in the configured entries.
pub(crate) fn host_allowed(url: &Url, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    allowed.iter().any(|entry| {
        let entry = entry.trim().trim_start_matches("www.").to_ascii_lowercase();
        !entry.is_empty() && (host == entry || host.ends_with(&format!(".{entry}")))
    })
}
