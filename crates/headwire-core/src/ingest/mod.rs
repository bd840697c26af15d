mod deadline;
mod orchestrator;
mod retention;
mod upsert;

pub use deadline::{CancelHandle, CancelToken, Deadline};
pub use orchestrator::{CycleSummary, IngestEvent, Ingestor};
pub use retention::{clear_all, purge_older_than, retention_threshold};
pub use upsert::{upsert_article, upsert_batch, BatchResult, UpsertOutcome};
