// src/pipeline/labels.rs

//! Label discovery: scan the whole catalog for shinsho-like series names and
//! report which of them the configured labels already cover.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Config, RawBibRecord};
use crate::pipeline::classify::{ImprintClassifier, MatchMode};
use crate::pipeline::normalize::series_name;
use crate::services::BibliographicSource;
use crate::storage::StateStore;
use crate::utils::http;

static VOLUME_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[;；]\s*.*$").expect("valid volume suffix pattern"));
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[0-9]+$").expect("valid trailing number pattern"));

/// Progress is logged roughly every this many scanned ISBNs.
const PROGRESS_INTERVAL: usize = 50_000;

/// A normalized series label and how many scanned books carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Result of a label discovery scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelReport {
    pub timestamp: DateTime<Utc>,
    pub total_shinsho_books: usize,
    pub total_unique_labels: usize,
    pub covered: Vec<LabelCount>,
    pub not_covered: Vec<LabelCount>,
}

/// Strip the volume designation and a trailing number from a series name.
///
/// # Examples
/// ```
/// use shinsho_finder::pipeline::normalize_label;
///
/// assert_eq!(normalize_label("岩波新書 ； 新赤版 1476"), "岩波新書");
/// assert_eq!(normalize_label("ブルーバックス B-2001"), "ブルーバックス B-");
/// assert_eq!(normalize_label("星海社新書 12"), "星海社新書");
/// ```
pub fn normalize_label(series: &str) -> String {
    let head = VOLUME_SUFFIX.replace(series, "");
    TRAILING_NUMBER.replace(&head, "").trim().to_string()
}

/// Running tally of normalized labels.
#[derive(Debug, Default)]
pub struct LabelTally {
    counts: HashMap<String, usize>,
    books: usize,
}

impl LabelTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a series name if it contains `keyword`. Returns whether it did.
    pub fn observe(&mut self, series: &str, keyword: &str) -> bool {
        if series.is_empty() || !series.contains(keyword) {
            return false;
        }
        *self.counts.entry(normalize_label(series)).or_default() += 1;
        self.books += 1;
        true
    }

    pub fn books(&self) -> usize {
        self.books
    }

    /// Build the report, splitting labels by bidirectional containment
    /// against the known labels. Labels are ordered by count, then name.
    pub fn into_report(self, classifier: &ImprintClassifier, now: DateTime<Utc>) -> LabelReport {
        let classifier = classifier.with_mode(MatchMode::Bidirectional);

        let mut sorted: Vec<LabelCount> = self
            .counts
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        let total_unique_labels = sorted.len();
        let (covered, not_covered): (Vec<_>, Vec<_>) = sorted
            .into_iter()
            .partition(|entry| classifier.is_tracked(&entry.label));

        LabelReport {
            timestamp: now,
            total_shinsho_books: self.books,
            total_unique_labels,
            covered,
            not_covered,
        }
    }
}

/// Scan the full coverage list and save a label report.
///
/// Failed batches are logged and counted as empty; only the coverage fetch
/// and the final save can fail the scan.
pub async fn run_label_discovery(
    config: &Config,
    source: &dyn BibliographicSource,
    store: &dyn StateStore,
    now: DateTime<Utc>,
) -> Result<LabelReport> {
    let discovery = &config.discovery;
    let classifier = ImprintClassifier::from_config(&config.classifier);

    let isbns = source.fetch_coverage().await?;
    log::info!(
        "Scanning {} ISBNs for series containing {:?}",
        isbns.len(),
        discovery.keyword
    );

    let mut tally = LabelTally::new();
    let mut scanned = 0usize;

    for batch in isbns.chunks(discovery.batch_size.max(1)) {
        let records = match source.fetch_details(batch).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Batch starting at {} failed: {}", batch[0], e);
                Vec::new()
            }
        };

        for (isbn, value) in batch.iter().zip(records) {
            let Some(value) = value else { continue };
            match RawBibRecord::decode(value, isbn) {
                Ok(record) => {
                    if let Some(series) = series_name(&record) {
                        tally.observe(series, &discovery.keyword);
                    }
                }
                Err(e) => log::debug!("{}", e),
            }
        }

        scanned += batch.len();
        if scanned % PROGRESS_INTERVAL < batch.len() {
            log::info!(
                "Progress: {} / {} ISBNs ({} shinsho books so far)",
                scanned,
                isbns.len(),
                tally.books()
            );
        }

        http::pause(discovery.request_delay_ms).await;
    }

    let report = tally.into_report(&classifier, now);
    log::info!(
        "Found {} shinsho books under {} labels ({} covered, {} not covered)",
        report.total_shinsho_books,
        report.total_unique_labels,
        report.covered.len(),
        report.not_covered.len()
    );
    for entry in &report.not_covered {
        log::info!("  not covered: {} ({} books)", entry.label, entry.count);
    }

    store.save_label_report(&report).await?;
    Ok(report)
}
