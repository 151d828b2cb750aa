// src/models/mod.rs

//! Domain models for the finder.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod book;
mod config;
pub mod onix;

// Re-export all public types
pub use book::{NOT_AVAILABLE, NormalizedBook, PostedSet};
pub use config::{
    ClassifierConfig, Config, DiscoveryConfig, FeedConfig, OpenBdConfig, PathsConfig,
    RecencyConfig, SocialConfig,
};
pub use onix::RawBibRecord;

#[cfg(test)]
pub(crate) use book::tests::sample_book;
