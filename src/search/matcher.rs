//! Evaluating a decoded message against a set of terms.
//!
//! Keywords are always literal: they are escaped before being compiled, so
//! `a.b` does not match `axb`. Matching is case-insensitive. With `exact`
//! the keyword must also stand as a whole word.

use regex::{Regex, RegexBuilder};

use crate::error::{MboxError, Result};
use crate::model::message::ParsedMessage;

use super::term::{SearchField, SearchTermSet};

/// Term patterns compiled once and reused for every message of a scan.
#[derive(Debug, Clone)]
pub struct CompiledTerms {
    patterns: Vec<(SearchField, Regex)>,
}

impl CompiledTerms {
    pub fn compile(terms: &SearchTermSet, exact: bool) -> Result<Self> {
        let patterns = terms
            .iter()
            .map(|term| Ok((term.field, build_pattern(&term.keyword, exact)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// `true` iff every term matches. Stops at the first failing term.
    pub fn matches(&self, message: &ParsedMessage) -> bool {
        let mut rendered: Option<String> = None;

        self.patterns.iter().all(|(field, pattern)| match field.header_name() {
            Some(name) => message
                .header(name)
                .is_some_and(|value| pattern.is_match(value)),
            None => {
                let text = rendered.get_or_insert_with(|| message.render());
                pattern.is_match(text)
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One-shot match of `message` against `terms`.
///
/// Prefer [`CompiledTerms`] when matching many messages.
pub fn matches(message: &ParsedMessage, terms: &SearchTermSet, exact: bool) -> Result<bool> {
    Ok(CompiledTerms::compile(terms, exact)?.matches(message))
}

fn build_pattern(keyword: &str, exact: bool) -> Result<Regex> {
    let escaped = regex::escape(keyword);
    let source = if exact {
        format!(r"\b{escaped}\b")
    } else {
        escaped
    };

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| MboxError::InvalidTerm {
            keyword: keyword.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::term::SearchTerm;

    fn message(headers: &[(&str, &str)], body: &str) -> ParsedMessage {
        ParsedMessage::new(
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body.to_string(),
            body.to_string(),
        )
    }

    fn terms(items: &[(&str, SearchField)]) -> SearchTermSet {
        SearchTermSet::new(items.iter().map(|(k, f)| SearchTerm::new(*k, *f)).collect())
    }

    #[test]
    fn test_exact_requires_whole_word() {
        let cat = terms(&[("cat", SearchField::All)]);
        let category = message(&[("Subject", "x")], "category listing\n");
        let sat = message(&[("Subject", "x")], "the cat sat\n");

        assert!(!matches(&category, &cat, true).unwrap());
        assert!(matches(&sat, &cat, true).unwrap());
        assert!(matches(&category, &cat, false).unwrap());
        assert!(matches(&sat, &cat, false).unwrap());
    }

    #[test]
    fn test_case_insensitive() {
        let msg = message(&[("Subject", "INVOICE #1")], "");
        assert!(matches(&msg, &terms(&[("invoice", SearchField::Subject)]), false).unwrap());
        assert!(matches(&msg, &terms(&[("Invoice", SearchField::Subject)]), true).unwrap());
    }

    #[test]
    fn test_missing_header_fails_term() {
        let msg = message(&[("From", "invoice@example.com")], "invoice attached\n");
        assert!(!matches(&msg, &terms(&[("invoice", SearchField::Subject)]), false).unwrap());
    }

    #[test]
    fn test_header_field_is_scoped() {
        let msg = message(
            &[("From", "alice@example.com"), ("To", "bob@example.com")],
            "alice wrote this\n",
        );
        assert!(matches(&msg, &terms(&[("alice", SearchField::From)]), false).unwrap());
        assert!(!matches(&msg, &terms(&[("alice", SearchField::To)]), false).unwrap());
    }

    #[test]
    fn test_all_and_content_see_headers_and_body() {
        let msg = message(&[("Subject", "quarterly")], "numbers inside\n");
        for field in [SearchField::All, SearchField::Content] {
            assert!(matches(&msg, &terms(&[("quarterly", field)]), false).unwrap());
            assert!(matches(&msg, &terms(&[("numbers", field)]), false).unwrap());
        }
    }

    #[test]
    fn test_terms_are_conjunctive_and_order_free() {
        let msg = message(&[("Subject", "Invoice"), ("From", "carol@x.org")], "due soon\n");
        let forward = terms(&[("invoice", SearchField::Subject), ("carol", SearchField::From)]);
        let backward = terms(&[("carol", SearchField::From), ("invoice", SearchField::Subject)]);
        let failing = terms(&[("invoice", SearchField::Subject), ("dave", SearchField::From)]);

        assert!(matches(&msg, &forward, false).unwrap());
        assert_eq!(
            matches(&msg, &forward, false).unwrap(),
            matches(&msg, &backward, false).unwrap()
        );
        assert!(!matches(&msg, &failing, false).unwrap());
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let msg = message(&[("Subject", "price (USD) is 3.50")], "");
        assert!(matches(&msg, &terms(&[("(USD)", SearchField::Subject)]), false).unwrap());
        assert!(matches(&msg, &terms(&[("3.50", SearchField::Subject)]), false).unwrap());
        assert!(!matches(&msg, &terms(&[("3x50", SearchField::Subject)]), false).unwrap());
        assert!(!matches(&msg, &terms(&[("a.*", SearchField::Subject)]), false).unwrap());
    }

    #[test]
    fn test_empty_term_set_matches_everything() {
        let msg = message(&[], "");
        assert!(matches(&msg, &SearchTermSet::default(), true).unwrap());
    }
}
