//! Audit ingestion server.
//!
//! A thin axum surface in front of the delivery pipeline: one submission
//! route per producer, each of which validates and translates its payload,
//! acknowledges the producer, and hands the canonical event to the bounded
//! ingest queue. A full queue is never an HTTP error: audit submission
//! reports success once the payload is valid.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::app;
pub use state::AppState;
