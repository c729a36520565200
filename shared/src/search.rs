//! Elasticsearch client for the latest brainwave-sensor reading.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{Error, Result};

/// One document from the sensor index.
///
/// Fields are kept as raw JSON: the headset bridge may index numbers or
/// strings, and `@timestamp` may use any Elasticsearch date format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub attention: Option<Value>,
    #[serde(default)]
    pub meditation: Option<Value>,
    #[serde(rename = "@timestamp", default)]
    pub timestamp: Option<Value>,
}

/// Spoken form of a field value. Null, empty, and structured values have none.
pub fn display_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Source of sensor readings.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Most recent reading, or `None` when the index is empty.
    async fn latest_reading(&self) -> Result<Option<SensorReading>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: SensorReading,
}

/// Query body: every document, newest first, one result.
pub fn latest_query() -> Value {
    json!({
        "size": 1,
        "query": {"match_all": {}},
        "sort": [{"@timestamp": {"order": "desc"}}]
    })
}

/// Reads sensor documents over the Elasticsearch REST API.
pub struct SearchClient {
    http: reqwest::Client,
    search_url: String,
}

impl SearchClient {
    /// `endpoint` may omit the scheme (`host:port`), in which case plain
    /// HTTP is assumed.
    pub fn new(http: reqwest::Client, endpoint: &str, index: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/');
        let base = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };

        Self {
            http,
            search_url: format!("{}/{}/_search", base, index),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

fn first_reading(body: &[u8]) -> Result<Option<SensorReading>> {
    let parsed: SearchResponse = serde_json::from_slice(body)?;
    Ok(parsed.hits.hits.into_iter().next().map(|hit| hit.source))
}

#[async_trait]
impl ReadingSource for SearchClient {
    async fn latest_reading(&self) -> Result<Option<SensorReading>> {
        let response = self
            .http
            .post(&self.search_url)
            .json(&latest_query())
            .send()
            .await
            .map_err(|e| Error::Search(format!("Failed to query index: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Search(format!("Failed to read search response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Search(format!(
                "Search failed: {} - {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let reading = first_reading(&body)?;
        debug!("Latest reading: {:?}", reading);
        Ok(reading)
    }
}
