// src/pipeline/run.rs

//! The finder run: diff coverage, classify new records, publish.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::models::{Config, NormalizedBook, OpenBdConfig, RawBibRecord};
use crate::pipeline::classify::ImprintClassifier;
use crate::pipeline::diff::IsbnDiffEngine;
use crate::pipeline::normalize::{normalize, series_name};
use crate::pipeline::recency::{RecencyPolicy, ReleaseFacts};
use crate::services::{BibliographicSource, SocialPublisher, publish_new_books, render_feed};
use crate::storage::StateStore;
use crate::utils::http;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub coverage_count: usize,
    pub previous_count: usize,
    pub new_isbn_count: usize,
    pub first_run: bool,
    pub records_fetched: usize,
    pub new_books: usize,
    pub posted: usize,
    pub catalog_size: usize,
}

/// Run the full pipeline once.
///
/// Pass `publisher: None` to skip social posting. Persisted documents are only
/// replaced at their save points, so a failed run leaves the previous state.
pub async fn run_pipeline(
    config: &Config,
    source: &dyn BibliographicSource,
    store: &dyn StateStore,
    publisher: Option<&dyn SocialPublisher>,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    log::info!("=== Shinsho Finder started ===");
    let classifier = ImprintClassifier::from_config(&config.classifier);
    let engine = IsbnDiffEngine::new();

    let current = source.fetch_coverage().await?;
    let previous = store.load_snapshot().await?;
    log::info!("Previous ISBN count: {}", previous.len());

    let diff = engine.calculate(&previous, &current);
    log::info!("New ISBNs found: {}", diff.added.len());

    let mut summary = RunSummary {
        coverage_count: current.len(),
        previous_count: previous.len(),
        new_isbn_count: diff.added.len(),
        first_run: diff.first_run,
        ..RunSummary::default()
    };

    if !diff.has_changes() {
        log::info!("No new ISBNs to process");
    } else if diff.first_run {
        log::warn!("First run: recording the ISBN snapshot without fetching details");
    } else {
        let records = fetch_details_batched(source, &diff.added, &config.openbd).await?;
        summary.records_fetched = records.len();

        let new_books = extract_tracked(records, &classifier, &config.recency.policy, now);
        summary.new_books = new_books.len();

        if new_books.is_empty() {
            log::info!("No new shinsho books found");
        } else {
            let mut catalog = store.load_catalog().await?;
            catalog.extend(new_books.iter().cloned());
            store.save_catalog(&catalog).await?;
            log::info!("Updated catalog ({} total books)", catalog.len());

            if let Some(publisher) = publisher.filter(|_| config.social.enabled) {
                let mut posted = store.load_posted().await?;
                summary.posted = publish_new_books(
                    &new_books,
                    &mut posted,
                    publisher,
                    &config.social,
                    &classifier,
                )
                .await;
                store.save_posted(&posted).await?;
            } else {
                log::info!("Social posting skipped");
            }
        }
    }

    let snapshot = engine.merged(&previous, &diff);
    store.save_snapshot(&snapshot).await?;
    log::info!("Saved ISBN list ({} ISBNs)", snapshot.len());

    summary.catalog_size = regenerate_feed(config, store, now).await?;
    log::info!("=== Shinsho Finder completed ===");
    Ok(summary)
}

/// Render the stored catalog to the feed. Returns the catalog size.
pub async fn regenerate_feed(
    config: &Config,
    store: &dyn StateStore,
    now: DateTime<Utc>,
) -> Result<usize> {
    let catalog = store.load_catalog().await?;
    let xml = render_feed(&catalog, &config.feed, now);
    store.save_feed(&xml).await?;
    log::info!(
        "Feed written with {} of {} books",
        catalog.len().min(config.feed.max_items),
        catalog.len()
    );
    Ok(catalog.len())
}

/// Fetch detail records in sequential batches, pausing between them.
///
/// Unknown ISBNs are dropped. Each record is paired with the ISBN it was
/// requested with. A failed batch fails the whole fetch.
pub async fn fetch_details_batched(
    source: &dyn BibliographicSource,
    isbns: &[String],
    config: &OpenBdConfig,
) -> Result<Vec<(String, Value)>> {
    let batch_size = config.batch_size.max(1);
    let total_batches = isbns.len().div_ceil(batch_size);
    let mut records = Vec::new();

    for (index, batch) in isbns.chunks(batch_size).enumerate() {
        log::info!(
            "Fetching batch {}/{} ({} ISBNs)",
            index + 1,
            total_batches,
            batch.len()
        );
        let values = source.fetch_details(batch).await?;
        records.extend(
            batch
                .iter()
                .zip(values)
                .filter_map(|(isbn, value)| value.map(|v| (isbn.clone(), v))),
        );

        if index + 1 < total_batches {
            http::pause(config.request_delay_ms).await;
        }
    }

    log::info!("Fetched {} records for {} ISBNs", records.len(), isbns.len());
    Ok(records)
}

/// Decode, classify and normalize fetched records, keeping tracked imprints
/// admitted by the recency policy. Malformed records are logged and skipped.
pub fn extract_tracked(
    records: Vec<(String, Value)>,
    classifier: &ImprintClassifier,
    policy: &RecencyPolicy,
    now: DateTime<Utc>,
) -> Vec<NormalizedBook> {
    let mut books = Vec::new();

    for (isbn, value) in records {
        let record = match RawBibRecord::decode(value, &isbn) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping record: {}", e);
                continue;
            }
        };

        let Some(series) = series_name(&record) else {
            continue;
        };
        if !classifier.is_tracked(series) {
            continue;
        }
        if !policy.admits(&ReleaseFacts::from(&record), now) {
            log::debug!("{} rejected by recency policy", isbn);
            continue;
        }

        if let Some(book) = normalize(&record, Some(&isbn), now) {
            log::info!("Found: {} ({})", book.title, book.series);
            books.push(book);
        }
    }

    log::info!("Found {} shinsho books", books.len());
    books
}
