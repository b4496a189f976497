//! Store-side half of the upload pipeline

pub mod upsert;

pub use upsert::{UpsertEngine, UpsertStats};
