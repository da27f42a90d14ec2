//! Raw and decoded message types.

/// The untouched text of one message, as cut out of an archive by the
/// splitter.
///
/// Includes the leading `From ` envelope line when the archive has one.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Zero-based position of the message inside its own archive.
    pub ordinal: u64,

    /// Lossily decoded text of the message, line terminators preserved.
    pub text: String,
}

impl RawMessage {
    /// The message without its `From ` envelope line, if it has one.
    pub fn without_envelope(&self) -> &str {
        strip_envelope(&self.text)
    }
}

/// Skip the `From ` envelope line at the start of an MBOX message.
pub(crate) fn strip_envelope(text: &str) -> &str {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.starts_with("From ") {
        match text.find('\n') {
            Some(pos) => &text[pos + 1..],
            None => "",
        }
    } else {
        text
    }
}

/// A decoded message: header fields plus body text.
///
/// Header values are kept raw (unfolded, encoded-words untouched), in the
/// order they appeared. Lookups are case-insensitive and the last
/// occurrence of a repeated header wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    headers: Vec<(String, String)>,
    raw_body: String,
    text: String,
}

impl ParsedMessage {
    /// Build a message from `(name, value)` header pairs, the undecoded
    /// body section, and the decoded plain-text body.
    pub fn new(headers: Vec<(String, String)>, raw_body: String, text: String) -> Self {
        Self {
            headers,
            raw_body,
            text,
        }
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All header pairs in their original order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("subject")
    }

    pub fn from(&self) -> Option<&str> {
        self.header("from")
    }

    pub fn to(&self) -> Option<&str> {
        self.header("to")
    }

    pub fn date(&self) -> Option<&str> {
        self.header("date")
    }

    /// Decoded plain-text body (all `text/*` parts, in order).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Body section exactly as it appeared after the header block.
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Re-serialize the message: headers, a blank line, then the raw body.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.raw_body.len() + 64 * self.headers.len());
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.raw_body);
        out
    }
}
