//! In-memory storage, used by tests and dry runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NormalizedBook, PostedSet};
use crate::pipeline::LabelReport;
use crate::storage::StateStore;

#[derive(Debug, Default)]
struct State {
    snapshot: Vec<String>,
    catalog: Vec<NormalizedBook>,
    posted: PostedSet,
    feed: Option<String>,
    label_report: Option<LabelReport>,
}

/// Storage backend holding every document in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a previous snapshot and catalog.
    pub fn with_state(snapshot: Vec<String>, catalog: Vec<NormalizedBook>) -> Self {
        Self {
            state: Mutex::new(State {
                snapshot,
                catalog,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().snapshot.clone()
    }

    pub fn catalog(&self) -> Vec<NormalizedBook> {
        self.lock().catalog.clone()
    }

    pub fn posted(&self) -> PostedSet {
        self.lock().posted.clone()
    }

    /// Last feed written, if any.
    pub fn feed(&self) -> Option<String> {
        self.lock().feed.clone()
    }

    pub fn label_report(&self) -> Option<LabelReport> {
        self.lock().label_report.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStorage {
    async fn load_snapshot(&self) -> Result<Vec<String>> {
        Ok(self.snapshot())
    }

    async fn save_snapshot(&self, isbns: &[String]) -> Result<()> {
        self.lock().snapshot = isbns.to_vec();
        Ok(())
    }

    async fn load_catalog(&self) -> Result<Vec<NormalizedBook>> {
        Ok(self.catalog())
    }

    async fn save_catalog(&self, books: &[NormalizedBook]) -> Result<()> {
        self.lock().catalog = books.to_vec();
        Ok(())
    }

    async fn load_posted(&self) -> Result<PostedSet> {
        Ok(self.posted())
    }

    async fn save_posted(&self, posted: &PostedSet) -> Result<()> {
        self.lock().posted = posted.clone();
        Ok(())
    }

    async fn save_feed(&self, xml: &str) -> Result<()> {
        self.lock().feed = Some(xml.to_string());
        Ok(())
    }

    async fn save_label_report(&self, report: &LabelReport) -> Result<()> {
        self.lock().label_report = Some(report.clone());
        Ok(())
    }
}
