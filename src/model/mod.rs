//! Core data model types: raw and decoded messages, search results.

pub mod message;
pub mod record;
