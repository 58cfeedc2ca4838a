// src/services/mod.rs
pub mod analysis;
pub mod completion;
pub mod metrics_manager;
pub mod relay;
pub mod session_context;
pub mod session_manager;
