// Job application assistant: field extraction, tool contract, reconciliation,
// and the per-session turn pipeline.

pub mod extractor;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod reconcile;
pub mod session;
pub mod summary;
pub mod tool;
