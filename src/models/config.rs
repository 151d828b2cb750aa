//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pipeline::{MatchMode, RecencyPolicy};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// openBD endpoints and request pacing
    #[serde(default)]
    pub openbd: OpenBdConfig,

    /// Known imprint labels and how series names are matched against them
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Optional release-date filter applied after classification
    #[serde(default)]
    pub recency: RecencyConfig,

    /// RSS channel settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Social posting settings
    #[serde(default)]
    pub social: SocialConfig,

    /// Label discovery scan settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Storage keys relative to the storage root
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.openbd.user_agent.trim().is_empty() {
            return Err(AppError::validation("openbd.user_agent is empty"));
        }
        if self.openbd.timeout_secs == 0 {
            return Err(AppError::validation("openbd.timeout_secs must be > 0"));
        }
        if self.openbd.batch_size == 0 {
            return Err(AppError::validation("openbd.batch_size must be > 0"));
        }
        if self.discovery.batch_size == 0 {
            return Err(AppError::validation("discovery.batch_size must be > 0"));
        }
        if self.classifier.labels.iter().all(|l| l.trim().is_empty()) {
            return Err(AppError::validation("No imprint labels defined"));
        }
        if self.feed.max_items == 0 {
            return Err(AppError::validation("feed.max_items must be > 0"));
        }
        self.recency.policy.validate()?;
        url::Url::parse(&self.openbd.coverage_url)?;
        url::Url::parse(&self.openbd.get_url)?;
        url::Url::parse(&self.social.endpoint)?;
        Ok(())
    }
}

/// openBD API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenBdConfig {
    /// Endpoint returning every ISBN known to openBD
    #[serde(default = "defaults::coverage_url")]
    pub coverage_url: String,

    /// Endpoint returning detail records for comma-separated ISBNs
    #[serde(default = "defaults::get_url")]
    pub get_url: String,

    /// Maximum ISBNs per detail request (API limit)
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Delay between detail batches in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenBdConfig {
    fn default() -> Self {
        Self {
            coverage_url: defaults::coverage_url(),
            get_url: defaults::get_url(),
            batch_size: defaults::batch_size(),
            request_delay_ms: defaults::request_delay(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Imprint classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Known shinsho imprint labels
    #[serde(default = "defaults::labels")]
    pub labels: Vec<String>,

    /// Containment direction used by the main filter
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            labels: defaults::labels(),
            match_mode: MatchMode::default(),
        }
    }
}

/// Release recency filter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecencyConfig {
    #[serde(default)]
    pub policy: RecencyPolicy,
}

/// RSS channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "defaults::feed_title")]
    pub title: String,

    #[serde(default = "defaults::feed_description")]
    pub description: String,

    #[serde(default = "defaults::site_url")]
    pub site_url: String,

    #[serde(default = "defaults::feed_url")]
    pub feed_url: String,

    #[serde(default = "defaults::language")]
    pub language: String,

    /// Channel time-to-live in minutes
    #[serde(default = "defaults::ttl")]
    pub ttl_minutes: u32,

    /// Most recent books included in the feed
    #[serde(default = "defaults::max_items")]
    pub max_items: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: defaults::feed_title(),
            description: defaults::feed_description(),
            site_url: defaults::site_url(),
            feed_url: defaults::feed_url(),
            language: defaults::language(),
            ttl_minutes: defaults::ttl(),
            max_items: defaults::max_items(),
        }
    }
}

/// Social posting settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Marketplace affiliate tag appended to post links
    #[serde(default = "defaults::affiliate_tag")]
    pub affiliate_tag: String,

    /// Fixed hashtags placed before the derived ones
    #[serde(default = "defaults::hashtags")]
    pub hashtags: Vec<String>,

    /// Delay between posts in milliseconds
    #[serde(default = "defaults::post_delay")]
    pub post_delay_ms: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            endpoint: defaults::endpoint(),
            affiliate_tag: defaults::affiliate_tag(),
            hashtags: defaults::hashtags(),
            post_delay_ms: defaults::post_delay(),
        }
    }
}

/// Label discovery scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "defaults::discovery_batch_size")]
    pub batch_size: usize,

    #[serde(default = "defaults::discovery_delay")]
    pub request_delay_ms: u64,

    /// Series names must contain this to be tallied
    #[serde(default = "defaults::keyword")]
    pub keyword: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::discovery_batch_size(),
            request_delay_ms: defaults::discovery_delay(),
            keyword: defaults::keyword(),
        }
    }
}

/// Storage keys, relative to the storage root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::isbn_list")]
    pub isbn_list: String,

    #[serde(default = "defaults::catalog")]
    pub catalog: String,

    #[serde(default = "defaults::posted")]
    pub posted: String,

    #[serde(default = "defaults::feed")]
    pub feed: String,

    #[serde(default = "defaults::label_report")]
    pub label_report: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            isbn_list: defaults::isbn_list(),
            catalog: defaults::catalog(),
            posted: defaults::posted(),
            feed: defaults::feed(),
            label_report: defaults::label_report(),
        }
    }
}

mod defaults {
    // openBD defaults
    pub fn coverage_url() -> String {
        "https://api.openbd.jp/v1/coverage".into()
    }
    pub fn get_url() -> String {
        "https://api.openbd.jp/v1/get".into()
    }
    pub fn batch_size() -> usize {
        10_000
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; shinsho-finder/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }

    // Classifier defaults
    pub fn labels() -> Vec<String> {
        [
            "岩波新書",
            "中公新書",
            "ちくま新書",
            "講談社現代新書",
            "文春新書",
            "新潮新書",
            "集英社新書",
            "光文社新書",
            "幻冬舎新書",
            "PHP新書",
            "平凡社新書",
            "小学館新書",
            "ベスト新書",
            "角川新書",
            "ちくまプリマー新書",
            "中公新書ラクレ",
            "講談社＋α新書",
            "講談社+α新書",
            "SB新書",
            "ブルーバックス",
            "岩波ジュニア新書",
            "朝日新書",
            "祥伝社新書",
            "扶桑社新書",
            "宝島社新書",
            "NHK出版新書",
            "サイエンス・アイ新書",
            "星海社新書",
            "PHPビジネス新書",
            "ハヤカワ新書",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Feed defaults
    pub fn feed_title() -> String {
        "新書ファインダー".into()
    }
    pub fn feed_description() -> String {
        "openBD APIを使用した新書の新刊情報フィード".into()
    }
    pub fn site_url() -> String {
        "https://analekt.github.io/shinsho-finder/".into()
    }
    pub fn feed_url() -> String {
        "https://analekt.github.io/shinsho-finder/index.xml".into()
    }
    pub fn language() -> String {
        "ja".into()
    }
    pub fn ttl() -> u32 {
        1440
    }
    pub fn max_items() -> usize {
        100
    }

    // Social defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn endpoint() -> String {
        "https://api.twitter.com/2/tweets".into()
    }
    pub fn affiliate_tag() -> String {
        "shinshofinder-22".into()
    }
    pub fn hashtags() -> Vec<String> {
        vec!["新書".into(), "新刊".into()]
    }
    pub fn post_delay() -> u64 {
        1000
    }

    // Discovery defaults
    pub fn discovery_batch_size() -> usize {
        100
    }
    pub fn discovery_delay() -> u64 {
        30
    }
    pub fn keyword() -> String {
        "新書".into()
    }

    // Path defaults
    pub fn isbn_list() -> String {
        "data/isbn-list.json".into()
    }
    pub fn catalog() -> String {
        "data/shinsho-database.json".into()
    }
    pub fn posted() -> String {
        "data/posted-isbns.json".into()
    }
    pub fn feed() -> String {
        "docs/index.xml".into()
    }
    pub fn label_report() -> String {
        "data/shinsho-labels-analysis.json".into()
    }
}
