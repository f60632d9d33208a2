//! Data models for wallet storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub address: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub network: String,
}
