//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CallRecord;

/// Response body for POST /store
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// The generated key
    pub key: String,
}

impl StoreResponse {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Response body for GET /retrieve/:key
#[derive(Debug, Clone, Serialize)]
pub struct RetrieveResponse {
    /// The requested key
    pub key: String,
    /// The stored value after decoding
    pub value: Value,
}

impl RetrieveResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for GET /page
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    /// The requested URL
    pub url: String,
    /// Page content, fresh or cached
    pub content: String,
}

impl PageResponse {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }
}

/// Response body for GET /page/count
#[derive(Debug, Clone, Serialize)]
pub struct AccessCountResponse {
    pub url: String,
    /// Number of page requests for the URL
    pub count: i64,
}

/// Response body for GET /calls/:method
#[derive(Debug, Clone, Serialize)]
pub struct CallsResponse {
    /// The instrumented method identifier
    pub method: String,
    /// Number of invocations since the last flush
    pub count: i64,
    /// Recorded invocations, oldest first
    pub calls: Vec<CallRecord>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_response_serialize() {
        let resp = StoreResponse::new("my_key");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({ "key": "my_key" }));
    }

    #[test]
    fn test_calls_response_serialize() {
        let resp = CallsResponse {
            method: "InstrumentedCache::store".to_string(),
            count: 1,
            calls: vec![CallRecord {
                inputs: json!(["a"]),
                output: Some(json!("k")),
            }],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["calls"][0]["inputs"], json!(["a"]));
        assert_eq!(json["calls"][0]["output"], json!("k"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
