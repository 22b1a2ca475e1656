use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only traffic sample recorded from a node poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficSample {
    pub id: u64,
    pub user_id: u64,
    pub inbound_id: u64,
    pub upload: i64,
    pub download: i64,
    pub recorded_at: DateTime<Utc>,
}

impl TrafficSample {
    pub fn total(&self) -> i64 {
        self.upload + self.download
    }
}
