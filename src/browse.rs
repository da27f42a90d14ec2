//! Interactive result browsing over plain line-based I/O.
//!
//! The loop is a request/response exchange: print the list, read one
//! [`Selection`], answer it, repeat. Input and output are generic so the
//! whole exchange runs in tests against in-memory buffers.

use std::io::{self, BufRead, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::message::ParsedMessage;
use crate::model::record::ResultsIndex;

/// Default column budget for subjects in the result list.
pub const DEFAULT_SUBJECT_WIDTH: usize = 100;

/// One operator request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A 1-based display index (not yet range-checked).
    SelectByIndex(usize),
    Quit,
    /// Anything that is neither a number nor `q`.
    Invalid(String),
}

impl Selection {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("q") {
            return Self::Quit;
        }
        match trimmed.parse::<usize>() {
            Ok(index) => Self::SelectByIndex(index),
            Err(_) => Self::Invalid(trimmed.to_string()),
        }
    }
}

/// Presents a [`ResultsIndex`] and shows the messages the operator picks.
pub struct ResultBrowser<'a> {
    results: &'a ResultsIndex,
    subject_width: usize,
}

impl<'a> ResultBrowser<'a> {
    pub fn new(results: &'a ResultsIndex) -> Self {
        Self {
            results,
            subject_width: DEFAULT_SUBJECT_WIDTH,
        }
    }

    /// Truncate subjects in the list to `width` terminal columns (0 = no limit).
    pub fn with_subject_width(mut self, width: usize) -> Self {
        self.subject_width = width;
        self
    }

    /// Run until the operator quits or input ends.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> io::Result<()> {
        if self.results.is_empty() {
            return Ok(());
        }

        loop {
            self.render_list(out)?;
            write!(
                out,
                "\nEnter the number of the email to view (1-{}) or 'q' to quit: ",
                self.results.len()
            )?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                writeln!(out)?;
                return Ok(());
            };

            match Selection::parse(&line) {
                Selection::Quit => return Ok(()),
                Selection::SelectByIndex(index) => match self.results.by_display_index(index) {
                    Some(record) => {
                        writeln!(
                            out,
                            "\nViewing email from {}, message index {}",
                            record.archive_name(),
                            record.ordinal
                        )?;
                        render_message(out, &record.message)?;
                        write!(out, "\nPress Enter to continue...")?;
                        out.flush()?;
                        if read_line(input)?.is_none() {
                            writeln!(out)?;
                            return Ok(());
                        }
                    }
                    None => writeln!(out, "Invalid number. Please try again.")?,
                },
                Selection::Invalid(_) => {
                    writeln!(out, "Invalid input. Please enter a number or 'q'.")?
                }
            }
        }
    }

    /// Print the numbered `N. [archive] subject` list.
    pub fn render_list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, record) in self.results.iter().enumerate() {
            let subject = record.message.subject().unwrap_or("(no subject)");
            writeln!(
                out,
                "{}. [{}] {}",
                i + 1,
                record.archive_name(),
                truncate_to_width(subject, self.subject_width)
            )?;
        }
        Ok(())
    }
}

/// Print the From/To/Subject/Date headers and the plain-text body.
pub fn render_message<W: Write>(out: &mut W, message: &ParsedMessage) -> io::Result<()> {
    writeln!(out, "From: {}", message.from().unwrap_or(""))?;
    writeln!(out, "To: {}", message.to().unwrap_or(""))?;
    writeln!(out, "Subject: {}", message.subject().unwrap_or(""))?;
    writeln!(out, "Date: {}", message.date().unwrap_or(""))?;
    writeln!(out, "\nContent:")?;
    writeln!(out, "{}", message.text().trim_end())
}

/// Read one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 || text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
