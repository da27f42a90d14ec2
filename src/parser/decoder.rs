//! Turning a raw message blob into headers and body text.

use std::borrow::Cow;

use mail_parser::MessageParser;

use crate::error::Result;
use crate::model::message::{ParsedMessage, RawMessage};
use crate::parser::header::{split_header_block, unfold_headers};

/// Capability that decodes one raw message.
///
/// Implementations must not panic on malformed input; they return
/// [`MboxError::Decode`](crate::error::MboxError::Decode) instead so the
/// caller can skip the message.
pub trait MessageDecoder {
    fn decode(&self, raw: &RawMessage) -> Result<ParsedMessage>;
}

/// Default decoder.
///
/// Headers are taken verbatim from the header block (unfolded, not
/// RFC 2047-decoded). The plain-text body comes from `mail-parser`, which
/// walks multipart structures and undoes transfer encodings; when it cannot
/// make sense of the message the raw body is used instead. Text without
/// any header field is a message with no headers whose body is the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MailDecoder;

impl MessageDecoder for MailDecoder {
    fn decode(&self, raw: &RawMessage) -> Result<ParsedMessage> {
        let text = raw.without_envelope();
        let (header_block, raw_body) = split_header_block(text);
        let headers = unfold_headers(header_block);

        let body = if headers.is_empty() {
            raw_body.to_string()
        } else {
            let source = mail_source(text, header_block, raw_body);
            extract_text(source.as_bytes()).unwrap_or_else(|| raw_body.to_string())
        };

        Ok(ParsedMessage::new(headers, raw_body.to_string(), body))
    }
}

/// The message as `mail-parser` should see it: header block, blank line,
/// body. A header block cut short by a non-header line gets the missing
/// blank line so that line is not read as a header.
fn mail_source<'a>(text: &'a str, header_block: &str, raw_body: &str) -> Cow<'a, str> {
    if raw_body.is_empty() || header_block.len() + raw_body.len() < text.len() {
        return Cow::Borrowed(text);
    }
    let eol = if header_block.ends_with("\r\n") { "\r\n" } else { "\n" };
    Cow::Owned(format!("{header_block}{eol}{raw_body}"))
}

/// Collect every text part of the message, in order.
///
/// Returns `None` when `mail-parser` cannot parse the message or finds no
/// text part at all.
fn extract_text(message_bytes: &[u8]) -> Option<String> {
    let parsed = MessageParser::default().parse(message_bytes)?;

    let mut parts: Vec<String> = Vec::new();
    let mut pos = 0;
    while let Some(part) = parsed.body_text(pos) {
        parts.push(part.into_owned());
        pos += 1;
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawMessage {
        RawMessage {
            ordinal: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_decode_simple_message() {
        let msg = MailDecoder
            .decode(&raw(
                "From a@b.c Mon Jan 1 00:00:00 2024\n\
                 From: Alice <alice@example.com>\n\
                 To: bob@example.com\n\
                 Subject: Hello\n\
                 \n\
                 Hi Bob.\n",
            ))
            .unwrap();
        assert_eq!(msg.subject(), Some("Hello"));
        assert_eq!(msg.from(), Some("Alice <alice@example.com>"));
        assert_eq!(msg.raw_body(), "Hi Bob.\n");
        assert!(msg.text().contains("Hi Bob."));
    }

    #[test]
    fn test_decode_base64_body() {
        let msg = MailDecoder
            .decode(&raw(
                "From: a@b.c\n\
                 Subject: encoded\n\
                 Content-Type: text/plain; charset=utf-8\n\
                 Content-Transfer-Encoding: base64\n\
                 \n\
                 SG9sYSBtdW5kbw==\n",
            ))
            .unwrap();
        assert!(msg.text().contains("Hola mundo"));
        assert!(msg.raw_body().contains("SG9sYSBtdW5kbw=="));
    }

    #[test]
    fn test_decode_multipart_keeps_plain_text() {
        let msg = MailDecoder
            .decode(&raw(
                "From: a@b.c\n\
                 Subject: parts\n\
                 MIME-Version: 1.0\n\
                 Content-Type: multipart/mixed; boundary=\"XX\"\n\
                 \n\
                 --XX\n\
                 Content-Type: text/plain\n\
                 \n\
                 visible text\n\
                 --XX\n\
                 Content-Type: application/octet-stream\n\
                 Content-Disposition: attachment; filename=\"blob.bin\"\n\
                 \n\
                 binarystuff\n\
                 --XX--\n",
            ))
            .unwrap();
        assert!(msg.text().contains("visible text"));
        assert!(!msg.text().contains("binarystuff"));
    }

    #[test]
    fn test_envelope_only_message_decodes_empty() {
        let msg = MailDecoder.decode(&raw("From a@b.c Mon Jan 1 00:00:00 2024\n")).unwrap();
        assert!(msg.headers().is_empty());
        assert_eq!(msg.subject(), None);
    }

    #[test]
    fn test_empty_header_block_keeps_body() {
        let msg = MailDecoder
            .decode(&raw(
                "From x@example.com Mon Jan 1 00:00:00 2024\n\nbody mentions budget\n",
            ))
            .unwrap();
        assert!(msg.headers().is_empty());
        assert_eq!(msg.raw_body(), "body mentions budget\n");
        assert_eq!(msg.text(), "body mentions budget\n");
        assert_eq!(msg.render(), "\nbody mentions budget\n");
    }

    #[test]
    fn test_headerless_text_is_all_body() {
        let msg = MailDecoder
            .decode(&RawMessage {
                ordinal: 4,
                text: "hello world, plain notes\n".into(),
            })
            .unwrap();
        assert!(msg.headers().is_empty());
        assert_eq!(msg.subject(), None);
        assert_eq!(msg.text(), "hello world, plain notes\n");
    }

    #[test]
    fn test_line_after_stray_text_is_not_a_header() {
        let msg = MailDecoder
            .decode(&raw(
                "Subject: notes\n\
                 stray line\n\
                 To: bob@example.com\n\
                 \n\
                 tail\n",
            ))
            .unwrap();
        assert_eq!(msg.subject(), Some("notes"));
        assert_eq!(msg.to(), None);
        assert!(msg.raw_body().starts_with("stray line\n"));
        assert!(msg.text().contains("To: bob@example.com"));
    }
}
