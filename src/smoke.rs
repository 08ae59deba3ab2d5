//! Smoke check: fetch streamed records in full over HTTP.
//!
//! Counting matches says nothing about whether the records behind them can be
//! served. The smoke check fetches every record a query streamed and requires
//! a successful, non-empty JSON body for each one.

use futures::{stream, StreamExt};
use regress_suite::Query;
use regress_verify::VerifyError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

pub struct SmokeChecker {
    client: Client,
    entries_url: String,
    concurrency: usize,
}

impl SmokeChecker {
    /// Create a checker fetching from `<entries_url>/<id>?query=<text>`.
    pub fn new(entries_url: impl Into<String>, concurrency: usize) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            entries_url: entries_url.into().trim_end_matches('/').to_string(),
            concurrency: concurrency.max(1),
        })
    }

    pub fn entries_url(&self) -> &str {
        &self.entries_url
    }

    /// Fetch every record collected for `query`.
    ///
    /// Returns the number of records fetched. The first failure aborts the
    /// check and names the offending record.
    pub async fn check(&self, query: &Query) -> Result<usize, VerifyError> {
        info!(
            "[Query: {:?}] Fetching {} full entries...",
            query.text,
            query.ids.len()
        );

        let mut fetches = stream::iter(query.ids.iter().copied())
            .map(|id| async move { (id, self.fetch(&query.text, id).await) })
            .buffer_unordered(self.concurrency);

        let mut fetched = 0;
        while let Some((id, result)) = fetches.next().await {
            if let Err(reason) = result {
                return Err(VerifyError::Smoke {
                    query: query.text.clone(),
                    id,
                    reason,
                });
            }
            fetched += 1;
        }

        info!("Fetched {fetched} entries");
        Ok(fetched)
    }

    async fn fetch(&self, query: &str, id: u64) -> Result<(), String> {
        let url = format!("{}/{id}", self.entries_url);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("{url} returned status {status}"));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("undecodable body from {url}: {e}"))?;
        if is_empty(&body) {
            return Err(format!("empty body from {url}"));
        }
        Ok(())
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` carry no record.
fn is_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
    }
}
