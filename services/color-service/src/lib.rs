//! Color Service Library
//!
//! Picks random colors, stores them in Redis under timestamp keys and
//! tallies what has been stored.
//!
//! ## Endpoints
//!
//! - `GET /healthz`: liveness, always `200`
//! - `GET /metrics`: Prometheus text exposition
//! - `GET /api/color`: store and return a random color
//! - `GET /api/stats`: per-color counts over every stored value

pub mod api;
pub mod color;
pub mod config;
pub mod keys;
pub mod lifecycle;
pub mod prometheus;
pub mod store;
pub mod telemetry;

pub use api::{router, AppState};
pub use color::{Color, ColorTally};
pub use store::{ColorStore, MemoryStore, RedisStore, StoreConfig, StoreError};
