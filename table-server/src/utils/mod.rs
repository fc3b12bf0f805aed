//! Utilities: logging setup and error re-exports

pub mod logger;

// Unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use logger::{cleanup_old_logs, init_logger};
