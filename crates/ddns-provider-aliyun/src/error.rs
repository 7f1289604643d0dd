//! Aliyun provider errors

use thiserror::Error;

/// Failures talking to the Alidns API
#[derive(Error, Debug)]
pub enum AliyunError {
    /// The API answered with a `Code`/`Message` error body
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// Non-success status without a parseable error body
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or body read failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Parameters could not be encoded or signed
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl From<AliyunError> for ddns_core::Error {
    fn from(err: AliyunError) -> Self {
        match err {
            AliyunError::Transport(e) => ddns_core::Error::http(e.to_string()),
            other => ddns_core::Error::provider("aliyun", other.to_string()),
        }
    }
}
