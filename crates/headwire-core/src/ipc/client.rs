//! Typed client for the daemon socket.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::*;
use crate::feed::HeadlineView;
use crate::{Error, Result};

#[derive(Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// True when the daemon answers a ping
    pub async fn ping(&self) -> Result<bool> {
        match self.call(methods::PING, serde_json::Value::Null).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let result = self.call(methods::STATUS, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Most recent headlines, formatted for display
    pub async fn list_headlines(&self, limit: Option<u32>) -> Result<Vec<HeadlineView>> {
        let params = serde_json::to_value(HeadlineListParams { limit })?;
        let result = self.call(methods::HEADLINES_LIST, params).await?;
        let response: HeadlineListResponse = serde_json::from_value(result)?;
        Ok(response.headlines)
    }

    /// Run an ingestion cycle inside the daemon
    pub async fn fetch(&self) -> Result<FetchResponse> {
        let result = self.call(methods::HEADLINES_FETCH, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Delete headlines past the retention window
    pub async fn purge(&self) -> Result<u64> {
        let result = self.call(methods::HEADLINES_PURGE, serde_json::Value::Null).await?;
        let response: DeleteResponse = serde_json::from_value(result)?;
        Ok(response.deleted_count)
    }

    /// Delete every headline
    pub async fn clear(&self) -> Result<u64> {
        let result = self.call(methods::HEADLINES_CLEAR, serde_json::Value::Null).await?;
        let response: DeleteResponse = serde_json::from_value(result)?;
        Ok(response.deleted_count)
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| Error::Rpc {
            code: ERR_DAEMON_NOT_RUNNING,
            message: format!(
                "Failed to connect to daemon at {}: {}. Is the daemon running?",
                self.socket_path.display(),
                e
            ),
        })?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let request = Request::new(method).with_params(params);
        let request_json = serde_json::to_string(&request)?;

        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut response_line = String::new();
        reader.read_line(&mut response_line).await?;

        let response: Response = serde_json::from_str(&response_line)?;

        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or_else(|| Error::Other("Empty response".to_string()))
    }
}

/// Check if daemon is reachable
pub async fn is_daemon_running(socket_path: &std::path::Path) -> bool {
    let client = DaemonClient::new(socket_path.to_path_buf());
    client.ping().await.unwrap_or(false)
}
