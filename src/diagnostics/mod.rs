//! Request diagnostics: a JSONL log of every backend call and a reporter
//! that summarizes it.

pub mod logger;
pub mod reporter;
