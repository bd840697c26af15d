mod service;
pub mod tasks;

pub use service::{SchedulerEvent, SchedulerService};
pub use tasks::{build_ingestor, clear_all_headlines, purge_expired, run_ingestion_cycle};
