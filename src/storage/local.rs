//! Documents as files under a storage root.
//!
//! JSON documents are pretty-printed; the feed is written as-is. A save goes
//! to a `.partial` sibling first and is renamed over the target, so a crash
//! mid-save keeps the previous document.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::models::{NormalizedBook, PathsConfig, PostedSet};
use crate::pipeline::LabelReport;
use crate::storage::StateStore;

/// File-backed state store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    paths: PathsConfig,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, paths: PathsConfig) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a document key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Replace a document's contents, creating parent directories as needed.
    async fn replace(&self, key: &str, contents: &[u8]) -> Result<()> {
        let target = self.path(key);
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let partial = partial_path(&target);
        tokio::fs::write(&partial, contents).await?;
        tokio::fs::rename(&partial, &target).await?;
        Ok(())
    }

    async fn store_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.replace(key, &serde_json::to_vec_pretty(value)?).await
    }

    /// Raw document contents, `None` when it was never saved.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a JSON document; a missing document is the type's empty value.
    async fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(contents) = self.fetch(key).await? else {
            log::info!("{} not found, starting empty", self.path(key).display());
            return Ok(T::default());
        };
        Ok(serde_json::from_slice(&contents)?)
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load_snapshot(&self) -> Result<Vec<String>> {
        self.load_json(&self.paths.isbn_list).await
    }

    async fn save_snapshot(&self, isbns: &[String]) -> Result<()> {
        self.store_json(&self.paths.isbn_list, isbns).await
    }

    async fn load_catalog(&self) -> Result<Vec<NormalizedBook>> {
        self.load_json(&self.paths.catalog).await
    }

    async fn save_catalog(&self, books: &[NormalizedBook]) -> Result<()> {
        self.store_json(&self.paths.catalog, books).await
    }

    async fn load_posted(&self) -> Result<PostedSet> {
        self.load_json(&self.paths.posted).await
    }

    async fn save_posted(&self, posted: &PostedSet) -> Result<()> {
        self.store_json(&self.paths.posted, posted).await
    }

    async fn save_feed(&self, xml: &str) -> Result<()> {
        self.replace(&self.paths.feed, xml.as_bytes()).await
    }

    async fn save_label_report(&self, report: &LabelReport) -> Result<()> {
        self.store_json(&self.paths.label_report, report).await
    }
}
