//! Integration tests for the queue parser.
//!
//! These tests run realistic queue files through the public API.

use queue_dl_core::parser::{ParseError, QueueError, QueueStore, load_queue, parse_queue};

/// A queue mixing every supported line style plus noise.
#[test]
fn test_parse_realistic_markdown_queue() {
    let input = r#"
# Watch later

- https://www.youtube.com/watch?v=aaa111
- [Conference talk](https://vimeo.com/123456)
1. <https://youtu.be/bbb222>
* [Tutorial](https://www.youtube.com/watch?v=ccc333 "Part 1") (long)
Remember to check the playlist too
ftp://files.test/video.mp4
"#;

    let load = parse_queue(input);
    let urls: Vec<_> = load.urls().collect();

    assert_eq!(
        urls,
        vec![
            "https://www.youtube.com/watch?v=aaa111",
            "https://vimeo.com/123456",
            "https://youtu.be/bbb222",
            "https://www.youtube.com/watch?v=ccc333",
        ]
    );
    assert_eq!(load.skipped_count(), 2, "prose line and ftp URL are skipped");
}

/// Entries keep the 1-based line they came from, in file order.
#[test]
fn test_parse_preserves_line_numbers_and_order() {
    let load = parse_queue("https://a.test/1\n\nnot a url\n[Video](https://a.test/2)\n");

    assert_eq!(load.len(), 2);
    assert_eq!(load.entries[0].url, "https://a.test/1");
    assert_eq!(load.entries[0].line, 1);
    assert_eq!(load.entries[1].url, "https://a.test/2");
    assert_eq!(load.entries[1].line, 4);
    assert_eq!(load.entries[1].raw, "[Video](https://a.test/2)");

    assert_eq!(load.skipped.len(), 1);
    assert_eq!(load.skipped[0].line, 3);
    assert_eq!(load.skipped[0].reason, ParseError::NoUrl);
}

/// A URL listed twice is downloaded once; the repeat is reported.
#[test]
fn test_parse_duplicate_urls_are_skipped() {
    let load = parse_queue("https://a.test/1\n- [again](https://a.test/1)\n");

    assert_eq!(load.len(), 1);
    assert!(matches!(
        load.skipped[0].reason,
        ParseError::Duplicate { first_line: 1, .. }
    ));
}

/// Windows line endings and surrounding whitespace are tolerated.
#[test]
fn test_parse_crlf_and_whitespace() {
    let load = parse_queue("  https://a.test/1  \r\n\t[x](https://a.test/2)\r\n");
    let urls: Vec<_> = load.urls().collect();
    assert_eq!(urls, vec!["https://a.test/1", "https://a.test/2"]);
    assert_eq!(load.skipped_count(), 0);
}

/// Input with nothing but blank lines and comments yields an empty queue.
#[test]
fn test_parse_comments_only() {
    let load = parse_queue("# nothing here\n\n   \n# still nothing\n");
    assert!(load.is_empty());
    assert_eq!(load.skipped_count(), 0);
}

/// The allowed hosts filter rejects other hosts but keeps subdomains.
#[test]
fn test_store_with_allowed_hosts() {
    let store = QueueStore::new().with_allowed_hosts(vec!["youtube.com".to_string()]);
    let load = store.parse(
        "https://www.youtube.com/watch?v=1\nhttps://music.youtube.com/watch?v=2\nhttps://vimeo.com/3\n",
    );

    assert_eq!(load.len(), 2);
    assert!(matches!(
        load.skipped[0].reason,
        ParseError::HostNotAllowed { .. }
    ));
}

/// A missing queue file is an empty queue, not an error.
#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let load = load_queue(&dir.path().join("queue.md")).unwrap();
    assert!(load.is_empty());
}

/// A queue file that is not UTF-8 text cannot be parsed at all.
#[test]
fn test_load_non_utf8_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.md");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let result = load_queue(&path);
    assert!(matches!(result, Err(QueueError::Unreadable { .. })));
}

/// A queue file on disk parses like the same text in memory.
#[test]
fn test_load_file_matches_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.md");
    let text = "https://a.test/1\nnot a url\n[Video](https://a.test/2)\n";
    std::fs::write(&path, text).unwrap();

    let from_file = load_queue(&path).unwrap();
    let from_text = parse_queue(text);
    assert_eq!(from_file.entries, from_text.entries);
    assert_eq!(from_file.skipped_count(), from_text.skipped_count());
}
