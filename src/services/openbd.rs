// src/services/openbd.rs

//! openBD coverage and detail source.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::OpenBdConfig;
use crate::utils::http;

/// Source of ISBN coverage lists and per-ISBN detail records.
#[async_trait]
pub trait BibliographicSource: Send + Sync {
    /// Every ISBN currently known to the catalog.
    async fn fetch_coverage(&self) -> Result<Vec<String>>;

    /// Detail records for one batch, positionally aligned with `isbns`.
    /// `None` marks an ISBN the catalog does not know.
    async fn fetch_details(&self, isbns: &[String]) -> Result<Vec<Option<Value>>>;
}

/// HTTP client for the public openBD API.
pub struct OpenBdClient {
    client: Client,
    coverage_url: Url,
    get_url: Url,
}

impl OpenBdClient {
    /// Create a client with the configured endpoints, user agent and timeout.
    pub fn new(config: &OpenBdConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            coverage_url: Url::parse(&config.coverage_url)?,
            get_url: Url::parse(&config.get_url)?,
        })
    }

    /// Detail URL for a batch: `?isbn=a,b,c`.
    fn details_url(&self, isbns: &[String]) -> Url {
        let mut url = self.get_url.clone();
        url.query_pairs_mut().append_pair("isbn", &isbns.join(","));
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, context: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(context, format!("HTTP status {status}")));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BibliographicSource for OpenBdClient {
    async fn fetch_coverage(&self) -> Result<Vec<String>> {
        log::info!("Fetching coverage from {}", self.coverage_url);
        let isbns: Vec<String> = self.get_json(self.coverage_url.clone(), "coverage").await?;
        log::info!("Fetched {} ISBNs", isbns.len());
        Ok(isbns)
    }

    async fn fetch_details(&self, isbns: &[String]) -> Result<Vec<Option<Value>>> {
        if isbns.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.details_url(isbns);
        let records: Vec<Value> = self.get_json(url, "details").await?;
        Ok(records
            .into_iter()
            .map(|v| if v.is_null() { None } else { Some(v) })
            .collect())
    }
}
