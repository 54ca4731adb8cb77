//! Axum HTTP gateway exposing the directive pipeline.
//!
//! - Request body size limit (64KB max)
//! - Request timeout (30s)
//! - Loopback-only bind unless explicitly opted in

mod handlers;
mod server;

pub use server::{run_gateway, run_gateway_with_listener};

use crate::core::pipeline::Pipeline;
use std::sync::Arc;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
