//! Search engine: field-scoped terms, matching, and the archive scan.

pub mod coordinator;
pub mod match_log;
pub mod matcher;
pub mod term;

pub use self::coordinator::{SearchCoordinator, SearchSummary};
pub use self::match_log::MatchLog;
pub use self::matcher::{matches, CompiledTerms};
pub use self::term::{SearchField, SearchTerm, SearchTermSet};
