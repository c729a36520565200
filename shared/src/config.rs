//! Configuration management for the extension Lambdas.

use std::env;

use crate::{Error, Result};

/// Where Clova publishes the key it signs requests with.
pub const DEFAULT_SIGNATURE_KEY_URL: &str =
    "https://clova-cek-requests.line.me/.well-known/signature-public-key.pem";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Extension id registered in the Clova developer console
    pub application_id: String,
    /// Language tag attached to speech values
    pub default_language: String,
    /// Skip request signature verification
    pub debug_mode: bool,
    /// PEM encoded signing key (fetched from `signature_key_url` when absent)
    pub signature_public_key: Option<String>,
    pub signature_key_url: String,
    /// Elasticsearch base URL (sensor extension)
    pub search_endpoint: Option<String>,
    pub search_index: String,
    /// Person whose readings the sensor extension reports
    pub sensor_subject: String,
    /// DynamoDB table name (food extension)
    pub food_table: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let application_id = lookup("CLOVA_APPLICATION_ID")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Config("CLOVA_APPLICATION_ID not set".to_string()))?;

        let debug_mode = lookup("CLOVA_DEBUG_MODE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            application_id,
            default_language: lookup("CLOVA_DEFAULT_LANGUAGE").unwrap_or_else(|| "ja".to_string()),
            debug_mode,
            signature_public_key: lookup("CLOVA_SIGNATURE_PUBLIC_KEY"),
            signature_key_url: lookup("CLOVA_SIGNATURE_KEY_URL")
                .unwrap_or_else(|| DEFAULT_SIGNATURE_KEY_URL.to_string()),
            search_endpoint: lookup("SEARCH_ENDPOINT"),
            search_index: lookup("SEARCH_INDEX").unwrap_or_else(|| "mindwavemobile2".to_string()),
            sensor_subject: lookup("SENSOR_SUBJECT_NAME").unwrap_or_else(|| "森田".to_string()),
            food_table: lookup("FOOD_TABLE_NAME"),
        })
    }

    /// Search endpoint, required by the sensor extension.
    pub fn require_search_endpoint(&self) -> Result<&str> {
        self.search_endpoint
            .as_deref()
            .ok_or_else(|| Error::Config("SEARCH_ENDPOINT not set".to_string()))
    }

    /// Table name, required by the food extension.
    pub fn require_food_table(&self) -> Result<&str> {
        self.food_table
            .as_deref()
            .ok_or_else(|| Error::Config("FOOD_TABLE_NAME not set".to_string()))
    }
}
