//! End-to-end runs against an in-memory catalog source and storage.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use shinsho_finder::error::{AppError, Result};
use shinsho_finder::models::{Config, SocialConfig};
use shinsho_finder::pipeline::{RecencyPolicy, run_pipeline};
use shinsho_finder::services::{BibliographicSource, SocialPublisher};
use shinsho_finder::storage::{MemoryStorage, StateStore};

struct FakeSource {
    coverage: Vec<String>,
    details: HashMap<String, Value>,
    requested: Mutex<Vec<Vec<String>>>,
    fail_details: bool,
}

impl FakeSource {
    fn new(coverage: &[&str], details: Vec<(&str, Value)>) -> Self {
        Self {
            coverage: coverage.iter().map(|s| s.to_string()).collect(),
            details: details
                .into_iter()
                .map(|(isbn, v)| (isbn.to_string(), v))
                .collect(),
            requested: Mutex::new(Vec::new()),
            fail_details: false,
        }
    }

    fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl BibliographicSource for FakeSource {
    async fn fetch_coverage(&self) -> Result<Vec<String>> {
        Ok(self.coverage.clone())
    }

    async fn fetch_details(&self, isbns: &[String]) -> Result<Vec<Option<Value>>> {
        self.requested.lock().unwrap().push(isbns.to_vec());
        if self.fail_details {
            return Err(AppError::upstream("details", "HTTP status 500"));
        }
        Ok(isbns.iter().map(|i| self.details.get(i).cloned()).collect())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl SocialPublisher for RecordingPublisher {
    async fn post(&self, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.openbd.request_delay_ms = 0;
    config.social = SocialConfig {
        post_delay_ms: 0,
        ..SocialConfig::default()
    };
    config
}

fn detail(isbn: &str, series: &str, title: &str, pubdate: &str) -> Value {
    json!({
        "onix": {
            "ProductIdentifier": { "IDValue": isbn },
            "DescriptiveDetail": {
                "Collection": {
                    "TitleDetail": {
                        "TitleElement": [{ "TitleText": { "content": series } }]
                    }
                },
                "TitleDetail": { "TitleElement": { "TitleText": { "content": title } } },
                "Contributor": [
                    { "ContributorRole": ["A01"], "PersonName": { "content": "新書 太郎" } }
                ]
            },
            "PublishingDetail": { "Imprint": { "ImprintName": "岩波書店" } }
        },
        "summary": { "isbn": isbn, "pubdate": pubdate },
        "hanmoto": { "datekoukai": "2025-05-20" }
    })
}

const A: &str = "9784004310001";
const B: &str = "9784004310002";
const C: &str = "9784004319993";
const D: &str = "9784000000004";

fn scenario_source() -> FakeSource {
    FakeSource::new(
        &[A, B, C, D],
        vec![
            (C, detail(C, "岩波新書 ； 新赤版 2097", "新しい新書", "20250715")),
            (D, detail(D, "何かの全集 ； 3", "全集の一冊", "20250715")),
        ],
    )
}

#[tokio::test]
async fn new_tracked_book_is_cataloged_posted_and_fed() {
    let source = scenario_source();
    let store = MemoryStorage::with_state(vec![A.to_string(), B.to_string()], Vec::new());
    let recorder = RecordingPublisher::default();
    let publisher: &dyn SocialPublisher = &recorder;

    let summary = run_pipeline(&config(), &source, &store, Some(publisher), now())
        .await
        .unwrap();

    assert_eq!(summary.new_isbn_count, 2);
    assert_eq!(summary.new_books, 1);
    assert_eq!(summary.posted, 1);
    assert_eq!(source.requested(), vec![vec![C.to_string(), D.to_string()]]);

    let catalog = store.catalog();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].isbn13, C);
    assert_eq!(catalog[0].published_date, "2025年7月");
    assert_eq!(catalog[0].discovered_at, now());

    let posted = store.posted();
    assert!(posted.contains(C));
    assert!(!posted.contains(D));

    let texts = recorder.texts.lock().unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("『新しい新書』"));
    assert!(texts[0].contains("#岩波新書"));

    assert_eq!(store.snapshot(), vec![A, B, C, D]);
    let feed = store.feed().unwrap();
    assert!(feed.contains("<guid isPermaLink=\"false\">9784004319993</guid>"));
}

#[tokio::test]
async fn first_run_records_snapshot_without_fetching_details() {
    let source = scenario_source();
    let store = MemoryStorage::new();
    let recorder = RecordingPublisher::default();
    let publisher: &dyn SocialPublisher = &recorder;

    let summary = run_pipeline(&config(), &source, &store, Some(publisher), now())
        .await
        .unwrap();

    assert!(summary.first_run);
    assert!(source.requested().is_empty());
    assert_eq!(store.snapshot(), vec![A, B, C, D]);
    assert!(store.catalog().is_empty());
    assert!(recorder.texts.lock().unwrap().is_empty());
    assert!(store.feed().is_some());
}

#[tokio::test]
async fn second_run_with_no_changes_only_refreshes_feed() {
    let source = scenario_source();
    let known = [A, B, C, D].into_iter().map(String::from).collect();
    let store = MemoryStorage::with_state(known, Vec::new());

    let summary = run_pipeline(&config(), &source, &store, None, now())
        .await
        .unwrap();

    assert_eq!(summary.new_isbn_count, 0);
    assert!(source.requested().is_empty());
    assert!(store.feed().is_some());
}

#[tokio::test]
async fn snapshot_keeps_identifiers_missing_from_current_coverage() {
    let source = FakeSource::new(&[B, C], Vec::new());
    let store = MemoryStorage::with_state(vec![A.to_string(), B.to_string()], Vec::new());

    run_pipeline(&config(), &source, &store, None, now())
        .await
        .unwrap();

    assert_eq!(store.snapshot(), vec![A, B, C]);
}

#[tokio::test]
async fn failed_detail_fetch_leaves_state_untouched() {
    let mut source = scenario_source();
    source.fail_details = true;
    let store = MemoryStorage::with_state(vec![A.to_string(), B.to_string()], Vec::new());

    let result = run_pipeline(&config(), &source, &store, None, now()).await;

    assert!(result.is_err());
    assert_eq!(store.snapshot(), vec![A, B]);
    assert!(store.catalog().is_empty());
    assert!(store.feed().is_none());
}

#[tokio::test]
async fn recency_policy_drops_past_releases() {
    let source = FakeSource::new(
        &[A, B, C],
        vec![(C, detail(C, "岩波新書 ； 新赤版 1", "古い新書", "202401"))],
    );
    let store = MemoryStorage::with_state(vec![A.to_string(), B.to_string()], Vec::new());
    let mut config = config();
    config.recency.policy = RecencyPolicy::UpcomingRelease {
        registered_within_months: 3,
    };

    let summary = run_pipeline(&config, &source, &store, None, now())
        .await
        .unwrap();

    assert_eq!(summary.new_books, 0);
    assert!(store.catalog().is_empty());
    assert_eq!(store.load_snapshot().await.unwrap(), vec![A, B, C]);
}

#[tokio::test]
async fn detail_batches_follow_configured_size() {
    let source = scenario_source();
    let store = MemoryStorage::with_state(vec![A.to_string()], Vec::new());
    let mut config = config();
    config.openbd.batch_size = 2;

    run_pipeline(&config, &source, &store, None, now())
        .await
        .unwrap();

    assert_eq!(
        source.requested(),
        vec![
            vec![B.to_string(), C.to_string()],
            vec![D.to_string()]
        ]
    );
    assert_eq!(store.catalog().len(), 1);
    assert!(store.posted().is_empty());
}

#[tokio::test]
async fn repeated_coverage_entries_are_processed_once() {
    let source = FakeSource::new(
        &[A, B, C, C],
        vec![(C, detail(C, "岩波新書 ； 新赤版 2097", "新しい新書", "20250715"))],
    );
    let store = MemoryStorage::with_state(vec![A.to_string()], Vec::new());

    let summary = run_pipeline(&config(), &source, &store, None, now())
        .await
        .unwrap();

    assert_eq!(summary.new_isbn_count, 2);
    assert_eq!(source.requested(), vec![vec![B.to_string(), C.to_string()]]);
    assert_eq!(store.catalog().len(), 1);
    assert_eq!(store.snapshot(), vec![A, B, C]);
}
