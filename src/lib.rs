//! Limmo Spark service.
//!
//! One product endpoint: `POST /generate-spark`. A caller authenticates with
//! a bearer credential, sends their current mood, and gets back a short
//! motivational message written by a completion provider from the caller's
//! own journaled wins. Every request is an independent, stateless pass —
//! no cache, no retries, no persistence in this service.

pub mod auth;
pub mod config;
pub mod error;
pub mod provider;
pub mod repository;
pub mod rest;
pub mod spark;

use std::sync::Arc;

use config::SparkConfig;
use provider::CompletionProvider;
use repository::EntriesRepository;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<SparkConfig>,
    /// Wins storage + caller resolution (hosted backend in production,
    /// fakes in tests).
    pub repository: Arc<dyn EntriesRepository>,
    /// Text-completion endpoint that writes the Spark message.
    pub provider: Arc<dyn CompletionProvider>,
    pub started_at: std::time::Instant,
}
