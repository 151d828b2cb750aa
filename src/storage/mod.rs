//! Storage abstractions for run state persistence.
//!
//! Each document is loaded and saved whole and independently; a document that
//! does not exist yet loads as its empty default.
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! ├── data/
//! │   ├── isbn-list.json                # Known ISBNs (grows only)
//! │   ├── shinsho-database.json         # Catalog of classified books
//! │   ├── posted-isbns.json             # ISBNs already posted
//! │   └── shinsho-labels-analysis.json  # Label discovery report
//! └── docs/
//!     └── index.xml                     # RSS feed
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NormalizedBook, PostedSet};
use crate::pipeline::LabelReport;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for run state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the known ISBN snapshot (empty on first run).
    async fn load_snapshot(&self) -> Result<Vec<String>>;

    async fn save_snapshot(&self, isbns: &[String]) -> Result<()>;

    /// Load the catalog of classified books.
    async fn load_catalog(&self) -> Result<Vec<NormalizedBook>>;

    async fn save_catalog(&self, books: &[NormalizedBook]) -> Result<()>;

    /// Load the set of ISBNs already posted to the social channel.
    async fn load_posted(&self) -> Result<PostedSet>;

    async fn save_posted(&self, posted: &PostedSet) -> Result<()>;

    /// Write the rendered RSS document.
    async fn save_feed(&self, xml: &str) -> Result<()>;

    /// Write a label discovery report.
    async fn save_label_report(&self, report: &LabelReport) -> Result<()>;
}
