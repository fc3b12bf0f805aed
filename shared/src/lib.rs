//! Shared types for the table-service platform
//!
//! Domain types used by the server and its display clients: error taxonomy,
//! API response envelope, session and order models, and feed message types.

pub mod error;
pub mod feed;
pub mod models;
pub mod order;
pub mod session;
pub mod types;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use feed::FeedEvent;
