use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Operation names used as metric keys.
pub mod op {
    pub const FEEDBACK: &str = "feedback";
    pub const SCORE: &str = "score";
    pub const QUIZ: &str = "quiz";
    pub const TURN: &str = "turn";
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MetricsData {
    pub requests: HashMap<String, u64>,
    pub failures: HashMap<String, u64>,
    pub sessions_opened: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment_request(&self, operation: &str) {
        let mut data = self.inner.write().await;
        *data.requests.entry(operation.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_failure(&self, operation: &str) {
        let mut data = self.inner.write().await;
        *data.failures.entry(operation.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_sessions(&self) {
        self.inner.write().await.sessions_opened += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
