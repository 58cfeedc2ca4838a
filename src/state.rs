// src/state.rs
use std::sync::Arc;

use crate::config::{Config, DEFAULT_TURN_QUEUE_DEPTH};
use crate::services::completion::CompletionClient;
use crate::services::metrics_manager::MetricsManager;
use crate::services::session_manager::SessionManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub completion: Arc<dyn CompletionClient>,
    pub sessions: SessionManager,
    pub metrics: MetricsManager,
    pub turn_queue_depth: usize,
    pub admin_key: Option<String>,
}

impl AppState {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            completion,
            sessions: SessionManager::new(),
            metrics: MetricsManager::new(),
            turn_queue_depth: DEFAULT_TURN_QUEUE_DEPTH,
            admin_key: None,
        }
    }

    pub fn from_config(completion: Arc<dyn CompletionClient>, config: &Config) -> Self {
        Self {
            turn_queue_depth: config.turn_queue_depth,
            admin_key: config.admin_key.clone(),
            ..Self::new(completion)
        }
    }
}
