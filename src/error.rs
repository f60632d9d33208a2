use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet already exists: {0}")]
    WalletExists(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Key derivation error: {0}")]
    Keys(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out waiting for validation: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wallet directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WalletError::WalletExists(_) => (StatusCode::CONFLICT, self.to_string()),
            WalletError::WalletNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            WalletError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WalletError::InvalidSeed(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WalletError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WalletError::Network(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            WalletError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
