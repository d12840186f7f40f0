//! HTTP source for the stock API

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::collector::{validate_response, CollectorError};
use crate::domain::{Category, StockItem};

/// Source of live shop listings
#[async_trait]
pub trait StockSource: Send + Sync {
    /// Fetch and validate the current listing of `category`
    async fn fetch(&self, category: Category) -> Result<Vec<StockItem>, CollectorError>;
}

/// Stock API reached over HTTP at `<api_url>/<category>`
pub struct HttpStockSource {
    client: reqwest::Client,
    api_url: String,
}

impl HttpStockSource {
    pub fn new(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, category: Category) -> String {
        format!("{}/{}", self.api_url, category.as_str())
    }
}

#[async_trait]
impl StockSource for HttpStockSource {
    async fn fetch(&self, category: Category) -> Result<Vec<StockItem>, CollectorError> {
        let url = self.endpoint(category);
        debug!("⏱️ Requesting {} stock from {}", category, url);

        // Error payloads arrive with non-2xx statuses too, so the body is
        // always decoded and inspected
        let data: Value = self.client.get(&url).send().await?.json().await?;
        validate_response(category, &data)
    }
}
