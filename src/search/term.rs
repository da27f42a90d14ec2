//! Field-scoped search terms.
//!
//! # Syntax
//!
//! Each command-line term is either a bare keyword (`invoice`, searched in
//! the whole message) or `field:keyword` where `field` is one of `all`,
//! `subject`, `from`, `to`, `content`. A prefix that is not a known field
//! stays part of the keyword, so `http://example.com` searches for the URL.

use std::fmt;

/// Which part of a message a term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SearchField {
    /// The whole re-serialized message.
    #[default]
    All,
    Subject,
    From,
    To,
    /// Same scope as `All`.
    Content,
}

impl SearchField {
    /// Parse a field name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "subject" => Some(Self::Subject),
            "from" => Some(Self::From),
            "to" => Some(Self::To),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Subject => "subject",
            Self::From => "from",
            Self::To => "to",
            Self::Content => "content",
        }
    }

    /// Header consulted by this field, or `None` for whole-message fields.
    pub fn header_name(self) -> Option<&'static str> {
        match self {
            Self::All | Self::Content => None,
            Self::Subject => Some("subject"),
            Self::From => Some("from"),
            Self::To => Some("to"),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(keyword, field)` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub keyword: String,
    pub field: SearchField,
}

impl SearchTerm {
    pub fn new(keyword: impl Into<String>, field: SearchField) -> Self {
        Self {
            keyword: keyword.into(),
            field,
        }
    }

    /// Parse `field:keyword` or a bare keyword (field `all`).
    pub fn parse(token: &str) -> Self {
        if let Some((prefix, keyword)) = token.split_once(':') {
            if let Some(field) = SearchField::from_name(prefix) {
                return Self::new(keyword, field);
            }
        }
        Self::new(token, SearchField::All)
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.keyword)
    }
}

/// Ordered conjunction of search terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTermSet {
    terms: Vec<SearchTerm>,
}

impl SearchTermSet {
    pub fn new(terms: Vec<SearchTerm>) -> Self {
        Self { terms }
    }

    /// Build the term set from positional arguments and `--field`.
    ///
    /// A single argument combined with a field other than `all` is taken
    /// verbatim as a keyword for that field. In every other case each
    /// argument carries its own optional `field:` prefix.
    pub fn from_args(args: &[String], default_field: SearchField) -> Self {
        if let [only] = args {
            if default_field != SearchField::All {
                return Self::new(vec![SearchTerm::new(only.as_str(), default_field)]);
            }
        }
        Self::new(args.iter().map(|a| SearchTerm::parse(a)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchTerm> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchTermSet {
    type Item = &'a SearchTerm;
    type IntoIter = std::slice::Iter<'a, SearchTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_prefixed_term() {
        assert_eq!(
            SearchTerm::parse("subject:invoice"),
            SearchTerm::new("invoice", SearchField::Subject)
        );
        assert_eq!(
            SearchTerm::parse("FROM:alice"),
            SearchTerm::new("alice", SearchField::From)
        );
    }

    #[test]
    fn test_parse_bare_term() {
        assert_eq!(
            SearchTerm::parse("meeting"),
            SearchTerm::new("meeting", SearchField::All)
        );
    }

    #[test]
    fn test_unknown_prefix_stays_in_keyword() {
        assert_eq!(
            SearchTerm::parse("http://example.com"),
            SearchTerm::new("http://example.com", SearchField::All)
        );
    }

    #[test]
    fn test_keyword_may_contain_colons() {
        assert_eq!(
            SearchTerm::parse("subject:Re: lunch"),
            SearchTerm::new("Re: lunch", SearchField::Subject)
        );
    }

    #[test]
    fn test_single_term_uses_field_flag() {
        let set = SearchTermSet::from_args(&args(&["invoice"]), SearchField::Subject);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![&SearchTerm::new("invoice", SearchField::Subject)]
        );
    }

    #[test]
    fn test_field_flag_ignored_for_multiple_terms() {
        let set = SearchTermSet::from_args(&args(&["invoice", "to:bob"]), SearchField::Subject);
        let terms: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            terms,
            vec![
                SearchTerm::new("invoice", SearchField::All),
                SearchTerm::new("bob", SearchField::To),
            ]
        );
    }

    #[test]
    fn test_no_terms() {
        assert!(SearchTermSet::from_args(&[], SearchField::From).is_empty());
    }
}
