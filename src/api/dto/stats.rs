//! DTOs for runtime statistics.

use crate::domain::repositories::StoreStats;
use serde::{Deserialize, Serialize};

/// Response of `GET /stats/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: StoreStats,
}
