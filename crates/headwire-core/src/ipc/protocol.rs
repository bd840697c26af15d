//! Request/response types for talking to the daemon.
//!
//! Newline-delimited JSON-RPC style messages over a Unix socket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feed::HeadlineView;
use crate::ingest::CycleSummary;
use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Uuid, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Uuid, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Map a pipeline failure to the code a caller can act on
    pub fn from_error(id: Uuid, err: &Error) -> Self {
        let code = if err.is_timeout() {
            ERR_CYCLE_TIMEOUT
        } else if err.is_store_unavailable() {
            ERR_STORE_UNAVAILABLE
        } else {
            ERR_INTERNAL
        };
        Self::error(id, code, err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

// Error codes
pub const ERR_PARSE: i32 = -32700;
pub const ERR_INVALID_REQUEST: i32 = -32600;
pub const ERR_METHOD_NOT_FOUND: i32 = -32601;
pub const ERR_INVALID_PARAMS: i32 = -32602;
pub const ERR_INTERNAL: i32 = -32603;
pub const ERR_DAEMON_NOT_RUNNING: i32 = -32000;
/// The store could not be reached
pub const ERR_STORE_UNAVAILABLE: i32 = -32003;
/// The ingestion cycle ran past its deadline
pub const ERR_CYCLE_TIMEOUT: i32 = -32008;

// Method names
pub mod methods {
    pub const PING: &str = "ping";
    pub const STATUS: &str = "status";

    pub const HEADLINES_LIST: &str = "headlines.list";
    pub const HEADLINES_FETCH: &str = "headlines.fetch";
    pub const HEADLINES_PURGE: &str = "headlines.purge";
    pub const HEADLINES_CLEAR: &str = "headlines.clear";
}

// Parameter structures

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadlineListParams {
    pub limit: Option<u32>,
}

// Response structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime_secs: u64,
    pub scheduler_running: bool,
    pub headline_count: u64,
    pub feed_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineListResponse {
    pub headlines: Vec<HeadlineView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub new_headlines_count: usize,
    pub new_sources: Vec<String>,
}

impl From<&CycleSummary> for FetchResponse {
    fn from(summary: &CycleSummary) -> Self {
        Self {
            new_headlines_count: summary.inserted_count,
            new_sources: summary.sources.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(methods::HEADLINES_FETCH);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"method\":\"headlines.fetch\""));
    }

    #[test]
    fn test_error_codes_follow_failure_kind() {
        let id = Uuid::new_v4();
        let timeout = Response::from_error(id, &Error::CycleTimeout(Duration::from_secs(9)));
        let down = Response::from_error(id, &Error::StoreConnection("refused".into()));
        let other = Response::from_error(id, &Error::Other("boom".into()));

        assert_eq!(timeout.error.unwrap().code, ERR_CYCLE_TIMEOUT);
        assert_eq!(down.error.unwrap().code, ERR_STORE_UNAVAILABLE);
        assert_eq!(other.error.unwrap().code, ERR_INTERNAL);
    }

    #[test]
    fn test_fetch_response_uses_camel_case() {
        let mut summary = CycleSummary::default();
        summary.inserted_count = 1;
        summary.sources.insert("X".to_string());

        let json = serde_json::to_value(FetchResponse::from(&summary)).unwrap();
        assert_eq!(json, serde_json::json!({"newHeadlinesCount": 1, "newSources": ["X"]}));

        let json = serde_json::to_value(DeleteResponse { deleted_count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"deletedCount": 3}));
    }
}
