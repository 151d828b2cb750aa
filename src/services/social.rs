// src/services/social.rs

//! Social posts announcing newly found books.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{NOT_AVAILABLE, NormalizedBook, PostedSet, SocialConfig};
use crate::pipeline::ImprintClassifier;
use crate::services::oauth::OAuthCredentials;
use crate::utils::http;
use crate::utils::text::hashtag_body;

/// Destination for formatted posts.
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}

/// Publisher for the X (Twitter) v2 create-post endpoint.
pub struct XClient {
    client: Client,
    endpoint: String,
    credentials: OAuthCredentials,
}

impl XClient {
    pub fn new(client: Client, endpoint: impl Into<String>, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// Build a client from environment credentials, or `None` when unset.
    pub fn from_env(client: Client, config: &SocialConfig) -> Option<Self> {
        OAuthCredentials::from_env().map(|c| Self::new(client, config.endpoint.clone(), c))
    }
}

#[async_trait]
impl SocialPublisher for XClient {
    async fn post(&self, text: &str) -> Result<()> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let authorization = self
            .credentials
            .authorization_header("POST", &self.endpoint, &nonce, Utc::now().timestamp())
            .ok_or_else(|| AppError::config("Could not sign social request"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::social(status.as_u16(), body));
        }
        Ok(())
    }
}

/// Hashtags for a book: the configured fixed tags, then imprint and author.
pub fn hashtags(
    book: &NormalizedBook,
    config: &SocialConfig,
    classifier: &ImprintClassifier,
) -> Vec<String> {
    let label = classifier
        .matched_label(&book.series)
        .map(str::to_string)
        .unwrap_or_else(|| series_head(&book.series).to_string());
    let author = if book.author == NOT_AVAILABLE {
        String::new()
    } else {
        book.author.clone()
    };

    let mut tags: Vec<String> = Vec::new();
    for raw in config.hashtags.iter().chain([&label, &author]) {
        let tag = hashtag_body(raw);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Series string before any volume designation (`；`/`;`).
fn series_head(series: &str) -> &str {
    series
        .split([';', '；'])
        .next()
        .unwrap_or_default()
        .trim()
}

/// Render the post text for a book.
pub fn format_post(
    book: &NormalizedBook,
    config: &SocialConfig,
    classifier: &ImprintClassifier,
) -> String {
    let url = book.marketplace_url(Some(&config.affiliate_tag));
    let tags = hashtags(book, config, classifier)
        .iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "📚 新書新刊\n\n『{}』\n著者: {}\nシリーズ: {}\n発売: {}\n\n{}\n\n{}",
        book.title, book.author, book.series, book.published_date, url, tags
    )
}

/// Post every book not yet in `posted`, recording successes in it.
///
/// Failures are logged and skipped. Returns the number of books posted.
pub async fn publish_new_books(
    books: &[NormalizedBook],
    posted: &mut PostedSet,
    publisher: &dyn SocialPublisher,
    config: &SocialConfig,
    classifier: &ImprintClassifier,
) -> usize {
    let mut posted_count = 0;

    for book in books {
        if posted.contains(&book.isbn13) {
            log::info!("Skipping {} - already posted", book.isbn13);
            continue;
        }

        let text = format_post(book, config, classifier);
        log::info!("Posting: {}", book.title);
        match publisher.post(&text).await {
            Ok(()) => {
                posted.insert(book.isbn13.clone());
                posted_count += 1;
                log::info!("Posted: {}", book.title);
                http::pause(config.post_delay_ms).await;
            }
            Err(e) => log::error!("Error posting {}: {}", book.title, e),
        }
    }

    log::info!("Posted {} new books", posted_count);
    posted_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::models::sample_book;
    use crate::pipeline::MatchMode;

    /// Publisher that records texts and fails for texts containing a marker.
    #[derive(Default)]
    struct RecordingPublisher {
        texts: Mutex<Vec<String>>,
        fail_marker: Option<String>,
    }

    #[async_trait]
    impl SocialPublisher for RecordingPublisher {
        async fn post(&self, text: &str) -> Result<()> {
            if let Some(marker) = &self.fail_marker {
                if text.contains(marker.as_str()) {
                    return Err(AppError::social(503, "unavailable"));
                }
            }
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn classifier() -> ImprintClassifier {
        ImprintClassifier::new(
            vec!["岩波新書".to_string(), "講談社＋α新書".to_string()],
            MatchMode::Contains,
        )
    }

    fn config() -> SocialConfig {
        SocialConfig {
            post_delay_ms: 0,
            ..SocialConfig::default()
        }
    }

    #[test]
    fn formats_post_with_affiliate_link_and_hashtags() {
        let book = sample_book("9784004314769", "4004314763");
        let text = format_post(&book, &config(), &classifier());

        assert_eq!(
            text,
            "📚 新書新刊\n\n『日本語の考古学』\n著者: 今野 真二\nシリーズ: 岩波新書 ； 新赤版 1476\n発売: 2014年4月\n\nhttps://www.amazon.co.jp/dp/4004314763/?tag=shinshofinder-22\n\n#新書 #新刊 #岩波新書 #今野真二"
        );
    }

    #[test]
    fn hashtags_strip_punctuation_and_skip_missing_author() {
        let mut book = sample_book("9784065000000", "");
        book.series = "講談社＋α新書 ; 800-1".to_string();
        book.author = NOT_AVAILABLE.to_string();

        assert_eq!(
            hashtags(&book, &config(), &classifier()),
            vec!["新書", "新刊", "講談社α新書"]
        );
    }

    #[test]
    fn hashtags_fall_back_to_series_head() {
        let mut book = sample_book("9784065000000", "");
        book.series = "未登録新書；12".to_string();
        book.author = "山田・花子".to_string();

        assert_eq!(
            hashtags(&book, &config(), &classifier()),
            vec!["新書", "新刊", "未登録新書", "山田花子"]
        );
    }

    #[tokio::test]
    async fn publishes_only_unposted_books() {
        let books = vec![
            sample_book("9784004314769", "4004314763"),
            sample_book("9784004310938", "4004310938"),
        ];
        let mut posted: PostedSet = ["9784004310938".to_string()].into_iter().collect();
        let publisher = RecordingPublisher::default();

        let count =
            publish_new_books(&books, &mut posted, &publisher, &config(), &classifier()).await;

        assert_eq!(count, 1);
        assert!(posted.contains("9784004314769"));
        assert_eq!(publisher.texts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_posts_are_not_recorded() {
        let mut failing = sample_book("9784004310938", "4004310938");
        failing.title = "失敗する本".to_string();
        let books = vec![failing, sample_book("9784004314769", "4004314763")];
        let mut posted = PostedSet::default();
        let publisher = RecordingPublisher {
            fail_marker: Some("失敗する本".to_string()),
            ..RecordingPublisher::default()
        };

        let count =
            publish_new_books(&books, &mut posted, &publisher, &config(), &classifier()).await;

        assert_eq!(count, 1);
        assert!(!posted.contains("9784004310938"));
        assert!(posted.contains("9784004314769"));
    }
}
