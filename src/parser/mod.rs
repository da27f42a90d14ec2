//! Email parsing: MBOX streaming splitter, header handling, and message decoding.

pub mod decoder;
pub mod header;
pub mod mbox;
