//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::CacheValue;

/// Maximum accepted size of a stored value in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Request body for POST /store
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// Value to store: a string, an integer, a float, or an array of bytes
    pub value: CacheValue,
}

impl StoreRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.value.to_bytes().len() > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }
}

/// How GET /retrieve decodes the stored bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoding {
    /// Stored bytes as they are
    #[default]
    Raw,
    /// UTF-8 text
    Text,
    /// Decimal integer
    Int,
}

/// Query string for GET /retrieve/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveQuery {
    #[serde(default, rename = "as")]
    pub decoding: Decoding,
}

/// Query string for GET /page and GET /page/count
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub url: String,
}

impl PageQuery {
    /// Validates the URL
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Some("URL must use http or https".to_string());
        }
        None
    }
}
