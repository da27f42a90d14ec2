//! `mboxsearch`: search a tree of MBOX archives and browse the matches.
//!
//! This crate provides the core library: a streaming splitter that cuts
//! archives into messages, field-scoped term matching, the scan that ties
//! them together, and a locator that finds a message again by archive and
//! ordinal.

pub mod browse;
pub mod config;
pub mod error;
pub mod locate;
pub mod model;
pub mod parser;
pub mod scan;
pub mod search;
