//! End-to-end runs over an in-memory store with a scripted fetcher.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use feedwatch::error::FetchError;
use feedwatch::models::{
    Config, FetchedItem, FieldNames, RawRecord, RecordStatus, RunOutcome, SourceRecord,
};
use feedwatch::pipeline::SyncOrchestrator;
use feedwatch::services::{ContentFetcher, parse_feed};
use feedwatch::storage::{MemoryStore, RecordStore};
use feedwatch::utils::normalize;
use serde_json::{Value, json};
use url::Url;

type FetchResult = Result<Option<FetchedItem>, FetchError>;

/// Replays queued responses per strategy and counts calls.
#[derive(Default)]
struct ScriptedFetcher {
    feed: Mutex<VecDeque<FetchResult>>,
    page: Mutex<VecDeque<FetchResult>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn feed(self, result: FetchResult) -> Self {
        self.feed.lock().unwrap().push_back(result);
        self
    }

    fn page(self, result: FetchResult) -> Self {
        self.page.lock().unwrap().push_back(result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch_feed(&self, url: &str) -> FetchResult {
        self.calls.lock().unwrap().push(format!("feed {url}"));
        self.feed
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected feed fetch")
    }

    async fn fetch_by_selector(&self, url: &str, selector: &str) -> FetchResult {
        self.calls
            .lock()
            .unwrap()
            .push(format!("page {url} {selector}"));
        self.page
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected page fetch")
    }
}

/// Answers every feed with an item derived from its URL, after a short delay,
/// and tracks how many fetches were in flight at once.
#[derive(Default)]
struct SlowFeedFetcher {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl ContentFetcher for SlowFeedFetcher {
    async fn fetch_feed(&self, url: &str) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(50)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(FetchedItem::new(
            format!("Latest from {url}"),
            Some(format!("{url}/latest")),
        )))
    }

    async fn fetch_by_selector(&self, _url: &str, _selector: &str) -> FetchResult {
        panic!("unexpected page fetch")
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.delay_secs = 0;
    config.sync.write_timestamp = false;
    config
}

fn record(id: &str, status: &str, fields: &[(&str, &str)]) -> RawRecord {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "Name".into(),
        json!({ "type": "title", "title": [{ "plain_text": id }] }),
    );
    properties.insert(
        "Status".into(),
        json!({ "type": "select", "select": { "name": status } }),
    );
    for (key, value) in fields {
        let property = match *key {
            "RSS URL" | "Link" | "Last URL" => json!({ "type": "url", "url": value }),
            _ => json!({ "type": "rich_text", "rich_text": [{ "plain_text": value }] }),
        };
        properties.insert((*key).into(), property);
    }
    RawRecord {
        id: id.into(),
        properties,
    }
}

fn orchestrator(
    config: Config,
    store: &Arc<MemoryStore>,
    fetcher: &Arc<ScriptedFetcher>,
) -> SyncOrchestrator {
    SyncOrchestrator::new(Arc::new(config), store.clone(), fetcher.clone())
}

fn network_error() -> FetchResult {
    Err(FetchError::network("https://example.com/feed", "connection reset"))
}

/// Feed body with a single relative-link entry, parsed as the HTTP fetcher would.
fn feed_with_post_a() -> FetchResult {
    let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Posts</description>
    <item><title>Post A</title><link>/a</link></item>
  </channel>
</rss>"#;
    let url = Url::parse(&normalize("example.com/feed")).unwrap();
    parse_feed(xml.as_bytes(), &url)
}

fn decoded(store: &MemoryStore, id: &str) -> SourceRecord {
    let raw = store
        .records()
        .into_iter()
        .find(|r| r.id == id)
        .expect("record exists");
    SourceRecord::from_raw(&raw, &FieldNames::default())
}

#[tokio::test]
async fn first_capture_from_feed_is_an_update() {
    let store = Arc::new(MemoryStore::new(
        vec![record("blog", "Default", &[("RSS URL", "example.com/feed")])],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default().feed(feed_with_post_a()));

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(
        summary.report("blog").unwrap().outcome,
        RunOutcome::Updated {
            title: "Post A".into(),
            link: "https://example.com/a".into()
        }
    );
    assert_eq!(summary.updated, 1);

    let after = decoded(&store, "blog");
    assert_eq!(after.status, RecordStatus::Updated);
    assert_eq!(after.last_title, "Post A");
    assert_eq!(after.last_url, "https://example.com/a");
}

#[tokio::test]
async fn rerun_with_same_item_writes_nothing() {
    let store = Arc::new(MemoryStore::new(
        vec![record(
            "blog",
            "Default",
            &[
                ("RSS URL", "example.com/feed"),
                ("Last Title", "Post A"),
                ("Last URL", "https://example.com/a"),
            ],
        )],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default().feed(feed_with_post_a()));

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.report("blog").unwrap().outcome, RunOutcome::Unchanged);
    assert_eq!(summary.unchanged, 1);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn selector_without_match_marks_error_only() {
    let store = Arc::new(MemoryStore::new(
        vec![record(
            "page",
            "Default",
            &[
                ("Link", "https://example.com/blog"),
                ("Selector", "article h2 a"),
                ("Last Title", "Old post"),
                ("Last URL", "https://example.com/old"),
            ],
        )],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default().page(Ok(None)));

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(
        summary.report("page").unwrap().outcome,
        RunOutcome::Error(FetchError::NoItemFound)
    );
    assert_eq!(fetcher.calls().len(), 1, "no item found is not retried");

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].1.status, RecordStatus::Error);
    assert_eq!(writes[0].1.last_title, None);
    assert_eq!(writes[0].1.last_url, None);

    let after = decoded(&store, "page");
    assert_eq!(after.last_title, "Old post");
    assert_eq!(after.last_url, "https://example.com/old");
}

#[tokio::test]
async fn feed_failure_falls_back_to_selector() {
    let store = Arc::new(MemoryStore::new(
        vec![record(
            "both",
            "Error",
            &[
                ("RSS URL", "https://example.com/feed"),
                ("Link", "https://example.com/blog"),
                ("Selector", "h2 a"),
            ],
        )],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .feed(network_error())
            .feed(network_error())
            .page(Ok(Some(FetchedItem::new(
                "From HTML",
                Some("https://example.com/html".into()),
            )))),
    );

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(
        fetcher.calls(),
        vec![
            "feed https://example.com/feed",
            "feed https://example.com/feed",
            "page https://example.com/blog h2 a",
        ]
    );
    assert_eq!(
        summary.report("both").unwrap().outcome,
        RunOutcome::Updated {
            title: "From HTML".into(),
            link: "https://example.com/html".into()
        }
    );

    let writes = store.writes();
    assert_eq!(writes.len(), 1, "single write once the fallback settled");
    assert_eq!(writes[0].1.status, RecordStatus::Updated);
}

#[tokio::test]
async fn failed_fallback_does_not_go_back_to_feed() {
    let store = Arc::new(MemoryStore::new(
        vec![record(
            "both",
            "Default",
            &[
                ("RSS URL", "https://example.com/feed"),
                ("Link", "https://example.com/blog"),
                ("Selector", "h2 a"),
            ],
        )],
        100,
        FieldNames::default(),
    ));
    let page_error = FetchError::Status {
        url: "https://example.com/blog".into(),
        status: 500,
    };
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .feed(network_error())
            .feed(network_error())
            .page(Err(page_error.clone()))
            .page(Err(page_error.clone())),
    );

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(fetcher.calls().len(), 4);
    assert_eq!(
        summary.report("both").unwrap().outcome,
        RunOutcome::Error(page_error)
    );
    assert_eq!(decoded(&store, "both").status, RecordStatus::Error);
}

#[tokio::test]
async fn unconfigured_record_errors_without_fetching() {
    let store = Arc::new(MemoryStore::new(
        vec![record("empty", "Default", &[("Link", "https://example.com")])],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default());

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert!(fetcher.calls().is_empty());
    assert!(matches!(
        summary.report("empty").unwrap().outcome,
        RunOutcome::Error(FetchError::Configuration(_))
    ));
    assert_eq!(decoded(&store, "empty").status, RecordStatus::Error);
}

#[tokio::test]
async fn ineligible_statuses_are_skipped_without_writes() {
    let store = Arc::new(MemoryStore::new(
        vec![
            record("done", "Updated", &[("RSS URL", "https://example.com/feed")]),
            record("paused", "Paused", &[("RSS URL", "https://example.com/feed")]),
        ],
        1,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default());

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.total(), 2);
    assert!(fetcher.calls().is_empty());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn one_failing_record_does_not_affect_others() {
    let store = Arc::new(MemoryStore::new(
        vec![
            record("bad", "Default", &[("RSS URL", "https://bad.example/feed")]),
            record("good", "Default", &[("RSS URL", "example.com/feed")]),
        ],
        1,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .feed(Err(FetchError::malformed_feed(
                "https://bad.example/feed",
                "no feed root",
            )))
            .feed(Err(FetchError::malformed_feed(
                "https://bad.example/feed",
                "no feed root",
            )))
            .feed(feed_with_post_a()),
    );

    let summary = orchestrator(test_config(), &store, &fetcher)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(decoded(&store, "bad").status, RecordStatus::Error);
    assert_eq!(decoded(&store, "good").status, RecordStatus::Updated);
}

#[tokio::test]
async fn update_then_rerun_is_unchanged() {
    let store = Arc::new(MemoryStore::new(
        vec![record("blog", "Error", &[("RSS URL", "example.com/feed")])],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .feed(feed_with_post_a())
            .feed(feed_with_post_a()),
    );
    let orchestrator = orchestrator(test_config(), &store, &fetcher);

    let first = orchestrator.run().await.unwrap();
    assert_eq!(first.updated, 1);

    // An operator resets the status so the record is checked again.
    store
        .update(
            "blog",
            &feedwatch::models::RecordUpdate {
                status: RecordStatus::Default,
                last_title: None,
                last_url: None,
                last_updated_at: None,
            },
        )
        .await
        .unwrap();

    let second = orchestrator.run().await.unwrap();
    assert_eq!(second.report("blog").unwrap().outcome, RunOutcome::Unchanged);
}

#[tokio::test]
async fn timestamp_written_when_enabled() {
    let store = Arc::new(MemoryStore::new(
        vec![record("blog", "Default", &[("RSS URL", "example.com/feed")])],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(ScriptedFetcher::default().feed(feed_with_post_a()));
    let mut config = test_config();
    config.sync.write_timestamp = true;

    orchestrator(config, &store, &fetcher).run().await.unwrap();

    let writes = store.writes();
    assert!(writes[0].1.last_updated_at.is_some());
    let raw = &store.records()[0];
    assert!(matches!(
        raw.properties.get("Last Updated"),
        Some(Value::Object(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn concurrent_run_keeps_reports_and_writes_per_record() {
    let urls: Vec<String> = (0..6)
        .map(|i| format!("https://blog-{i}.example.com/feed"))
        .collect();
    let records = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            record(
                &format!("blog-{i}"),
                "Default",
                &[("RSS URL", url.as_str())],
            )
        })
        .collect();
    let store = Arc::new(MemoryStore::new(records, 2, FieldNames::default()));
    let fetcher = Arc::new(SlowFeedFetcher::default());
    let mut config = test_config();
    config.sync.max_concurrent = 4;

    let summary = SyncOrchestrator::new(Arc::new(config), store.clone(), fetcher.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.total(), 6);
    assert_eq!(summary.updated, 6);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.write_failures, 0);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 6);
    assert_eq!(fetcher.peak.load(Ordering::SeqCst), 4);

    for (i, url) in urls.iter().enumerate() {
        let id = format!("blog-{i}");
        assert_eq!(
            summary.report(&id).unwrap().outcome,
            RunOutcome::Updated {
                title: format!("Latest from {url}"),
                link: format!("{url}/latest"),
            }
        );
        let after = decoded(&store, &id);
        assert_eq!(after.status, RecordStatus::Updated);
        assert_eq!(after.last_url, format!("{url}/latest"));
    }

    let writes = store.writes();
    assert_eq!(writes.len(), 6);
    let written: HashSet<&str> = writes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(written.len(), 6, "one write per record");
}

#[tokio::test]
async fn strict_mode_rejects_title_only_match() {
    let store = Arc::new(MemoryStore::new(
        vec![record(
            "page",
            "Default",
            &[
                ("Link", "https://example.com/blog"),
                ("Selector", "article h2"),
            ],
        )],
        100,
        FieldNames::default(),
    ));
    let fetcher = Arc::new(
        ScriptedFetcher::default().page(Ok(Some(FetchedItem::new("Heading only", None)))),
    );
    let mut config = test_config();
    config.sync.require_complete_item = true;

    let summary = orchestrator(config, &store, &fetcher).run().await.unwrap();

    assert_eq!(
        summary.report("page").unwrap().outcome,
        RunOutcome::Error(FetchError::NoItemFound)
    );
    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].1.status, RecordStatus::Error);
    assert_eq!(writes[0].1.last_title, None);
    assert_eq!(decoded(&store, "page").last_title, "");
}
