//! Pipeline stages of a sync run.
//!
//! - `retry`: bounded retries with a fixed delay
//! - `detect`: change detection against the last recorded item
//! - `sync`: per-record orchestration and the run summary

pub mod detect;
pub mod retry;
pub mod sync;

pub use detect::{ChangeDetector, Detection};
pub use retry::{RetryPolicy, with_retry, with_retry_if};
pub use sync::{RecordReport, RunSummary, SyncOrchestrator};
