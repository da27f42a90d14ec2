//! Integration tests for the MBOX splitter and the default decoder.

use std::io::Cursor;
use std::path::Path;

use mboxsearch::error::Result;
use mboxsearch::model::message::RawMessage;
use mboxsearch::parser::decoder::{MailDecoder, MessageDecoder};
use mboxsearch::parser::mbox::{MboxSplitter, SplitOptions};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn split_file(name: &str) -> Vec<RawMessage> {
    MboxSplitter::open(fixture(name), &SplitOptions::default())
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

fn split_str(input: &str) -> Vec<RawMessage> {
    MboxSplitter::new(Cursor::new(input.as_bytes().to_vec()), "<memory>")
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

/// Boundary lines, plus one if non-empty input does not open with one.
fn expected_count(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    let boundaries = input.split_inclusive('\n').filter(|l| l.starts_with("From ")).count();
    if input.starts_with("From ") {
        boundaries
    } else {
        boundaries + 1
    }
}

// ─── Fixture archives ───────────────────────────────────────────────

#[test]
fn test_simple_mbox_has_five_messages() {
    let messages = split_file("simple.mbox");
    assert_eq!(messages.len(), 5);
    let ordinals: Vec<u64> = messages.iter().map(|m| m.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);
    assert!(messages
        .iter()
        .all(|m| m.text.starts_with("From ") && !m.text.is_empty()));
}

#[test]
fn test_empty_mbox_has_no_messages() {
    assert!(split_file("empty.mbox").is_empty());
}

#[test]
fn test_file_without_envelope_is_one_message() {
    let messages = split_file("no_envelope.mbox");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].ordinal, 0);
    let parsed = MailDecoder.decode(&messages[0]).unwrap();
    assert_eq!(parsed.subject(), Some("No envelope"));
}

#[test]
fn test_from_in_body_does_not_split() {
    let messages = split_file("simple.mbox");
    let memo = &messages[3];
    assert!(memo.text.contains("Greetings, From the desk of the manager."));
    assert!(memo.text.contains(">From here on"));
}

#[test]
fn test_resplitting_is_deterministic() {
    assert_eq!(split_file("simple.mbox"), split_file("simple.mbox"));
}

// ─── Count property over hand-picked inputs ─────────────────────────

#[test]
fn test_message_count_matches_boundary_rule() {
    let inputs = [
        "",
        "\n",
        "From a\n",
        "From a\nFrom b\nFrom c\n",
        "preamble\nFrom a\nbody\n",
        "no boundary at all",
        "From a\nbody mentions From b inline\n>From c\nFrom d",
        "Subject: x\n\nFrom the desk of the manager\nsigned\n",
        "From a\r\nSubject: crlf\r\n\r\nFrom b\r\n",
    ];

    for input in inputs {
        assert_eq!(
            split_str(input).len(),
            expected_count(input),
            "unexpected message count for {input:?}"
        );
    }
}

#[test]
fn test_split_preserves_every_byte_of_valid_input() {
    let input = "pre\nFrom a\nx\n\nFrom b\ny";
    let joined: String = split_str(input).into_iter().map(|m| m.text).collect();
    assert_eq!(joined, input);
}

// ─── Decoding fixture messages ──────────────────────────────────────

#[test]
fn test_decode_quoted_printable_body() {
    let messages = split_file("simple.mbox");
    let invoice = MailDecoder.decode(&messages[2]).unwrap();
    assert_eq!(invoice.subject(), Some("Invoice #2024-001"));
    assert!(invoice.text().contains("Café"), "got: {}", invoice.text());
    assert!(invoice.raw_body().contains("Caf=C3=A9"));
}

#[test]
fn test_decode_message_without_subject() {
    let messages = split_file("simple.mbox");
    let memo = MailDecoder.decode(&messages[3]).unwrap();
    assert_eq!(memo.subject(), None);
    assert_eq!(memo.from(), Some("The Manager <manager@example.com>"));
}
