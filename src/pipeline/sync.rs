// src/pipeline/sync.rs

//! Sync orchestration.
//!
//! For every record: skip ineligible statuses, extract the latest item (feed
//! first, selector fallback), detect changes, then write the state transition
//! once. Per-record failures are folded into the run summary and never abort
//! the run; only a store that cannot be listed does.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::error::{FetchError, Result};
use crate::models::{
    Config, FetchPlan, FetchedItem, PageTarget, RecordUpdate, RunOutcome, SourceRecord,
};
use crate::pipeline::detect::{ChangeDetector, Detection};
use crate::pipeline::retry::{RetryPolicy, with_retry_if};
use crate::services::ContentFetcher;
use crate::storage::RecordStore;

/// Outcome of one record, plus whether its store write failed.
#[derive(Debug, Clone)]
pub struct RecordReport {
    pub id: String,
    pub name: String,
    pub outcome: RunOutcome,
    pub write_error: Option<String>,
}

/// Aggregated counts for one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub skipped: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub errors: usize,
    pub write_failures: usize,
    pub reports: Vec<RecordReport>,
}

impl RunSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            skipped: 0,
            updated: 0,
            unchanged: 0,
            errors: 0,
            write_failures: 0,
            reports: Vec::new(),
        }
    }

    fn record(&mut self, report: RecordReport) {
        match report.outcome {
            RunOutcome::Skipped => self.skipped += 1,
            RunOutcome::Unchanged => self.unchanged += 1,
            RunOutcome::Updated { .. } => self.updated += 1,
            RunOutcome::Error(_) => self.errors += 1,
        }
        if report.write_error.is_some() {
            self.write_failures += 1;
        }
        self.reports.push(report);
    }

    /// Records looked at, including skipped ones.
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Look up the report of a record by id.
    pub fn report(&self, id: &str) -> Option<&RecordReport> {
        self.reports.iter().find(|r| r.id == id)
    }
}

/// Drives one run over every record in the store.
pub struct SyncOrchestrator {
    config: Arc<Config>,
    store: Arc<dyn RecordStore>,
    fetcher: Arc<dyn ContentFetcher>,
    detector: ChangeDetector,
    retry: RetryPolicy,
}

impl SyncOrchestrator {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn RecordStore>,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Self {
        let detector = if config.sync.require_complete_item {
            ChangeDetector::strict()
        } else {
            ChangeDetector::new()
        };
        let retry = config.retry.policy();

        Self {
            config,
            store,
            fetcher,
            detector,
            retry,
        }
    }

    /// Check every record once and write back state transitions.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::new(Utc::now());

        let records: Vec<SourceRecord> = self
            .store
            .list_records()
            .await?
            .iter()
            .map(|raw| SourceRecord::from_raw(raw, &self.config.fields))
            .collect();
        log::info!("Checking {} records", records.len());

        let concurrency = self.config.sync.max_concurrent.max(1);
        let mut reports = stream::iter(records)
            .map(|record| self.process_record(record))
            .buffer_unordered(concurrency);

        while let Some(report) = reports.next().await {
            summary.record(report);
        }

        summary.finished_at = Utc::now();
        log::info!(
            "Run complete: {} updated, {} unchanged, {} errors, {} skipped",
            summary.updated,
            summary.unchanged,
            summary.errors,
            summary.skipped
        );
        if summary.write_failures > 0 {
            log::warn!("{} store writes failed", summary.write_failures);
        }

        Ok(summary)
    }

    /// Run the full pipeline for one record.
    pub async fn process_record(&self, record: SourceRecord) -> RecordReport {
        let outcome = if record.status.is_eligible() {
            self.check(&record).await
        } else {
            RunOutcome::Skipped
        };
        log_outcome(&record, &outcome);

        let update = match &outcome {
            RunOutcome::Updated { title, link } => Some(RecordUpdate::updated(
                title.clone(),
                link.clone(),
                self.config.sync.write_timestamp.then(Utc::now),
            )),
            RunOutcome::Error(_) => Some(RecordUpdate::error()),
            RunOutcome::Skipped | RunOutcome::Unchanged => None,
        };

        let mut write_error = None;
        if let Some(update) = update {
            if let Err(e) = self.store.update(&record.id, &update).await {
                log::error!("[{}] store write failed: {}", record.label(), e);
                write_error = Some(e.to_string());
            }
        }

        RecordReport {
            id: record.id,
            name: record.name,
            outcome,
            write_error,
        }
    }

    /// Extract and classify. Never writes.
    async fn check(&self, record: &SourceRecord) -> RunOutcome {
        let fetched = match record.plan() {
            Ok(plan) => self.extract(&plan, record.label()).await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(item) => match self.detector.detect(
                item.as_ref(),
                &record.last_title,
                &record.last_url,
            ) {
                Detection::Updated { title, link } => RunOutcome::Updated { title, link },
                Detection::Unchanged => RunOutcome::Unchanged,
                Detection::NoItemFound => RunOutcome::Error(FetchError::NoItemFound),
            },
            Err(e) => RunOutcome::Error(e),
        }
    }

    /// Feed strategy with one-way fallback to the selector strategy.
    async fn extract(
        &self,
        plan: &FetchPlan,
        label: &str,
    ) -> std::result::Result<Option<FetchedItem>, FetchError> {
        match plan {
            FetchPlan::Feed { url, fallback } => {
                let fetcher = self.fetcher.as_ref();
                let result = with_retry_if(&self.retry, FetchError::is_retryable, move || {
                    fetcher.fetch_feed(url)
                })
                .await;

                match (result, fallback) {
                    (Err(e), Some(page)) => {
                        log::warn!("[{}] feed failed ({}), trying selector fallback", label, e);
                        self.fetch_page(page).await
                    }
                    (result, _) => result,
                }
            }
            FetchPlan::Page(page) => self.fetch_page(page).await,
        }
    }

    async fn fetch_page(
        &self,
        page: &PageTarget,
    ) -> std::result::Result<Option<FetchedItem>, FetchError> {
        let fetcher = self.fetcher.as_ref();
        let (url, selector) = (page.url.as_str(), page.selector.as_str());
        with_retry_if(&self.retry, FetchError::is_retryable, move || {
            fetcher.fetch_by_selector(url, selector)
        })
        .await
    }
}

fn log_outcome(record: &SourceRecord, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Skipped => log::debug!(
            "[{}] skipped (status: {})",
            record.label(),
            record.status
        ),
        RunOutcome::Error(_) => log::warn!("[{}] {}", record.label(), outcome),
        _ => log::info!("[{}] {}", record.label(), outcome),
    }
}
