//! RPC error types.

use thiserror::Error;

use vanguard_client::LedgerError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("no signer endpoint configured")]
    NoSigner,
}

impl From<RpcError> for LedgerError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Request(_) | RpcError::Status(_) => LedgerError::Transport(e.to_string()),
            RpcError::Decode(message) => LedgerError::InvalidResponse(message),
            other => LedgerError::Other(other.to_string()),
        }
    }
}
