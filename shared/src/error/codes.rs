//! Unified error codes for the table-service platform
//!
//! Error codes are shared between the server and its display clients so that
//! UI messaging can key off the numeric code instead of parsing free text.
//! Codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Scan/identity errors
//! - 4xxx: Session errors
//! - 5xxx: Order errors
//! - 6xxx: Capacity errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 for efficient serialization and cross-language
/// compatibility (Rust, TypeScript display clients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1002,
    /// Token is invalid
    TokenInvalid = 1003,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// A specific role is required for this transition
    RoleRequired = 2002,

    // ==================== 3xxx: Scan/Identity ====================
    /// Scanned token is neither numeric nor an opaque table identifier
    InvalidToken = 3001,
    /// Numeric token arrived without a resolvable restaurant context
    MissingRestaurant = 3002,

    // ==================== 4xxx: Session ====================
    /// Session not found
    SessionNotFound = 4001,
    /// Session is closed and can no longer be mutated
    SessionClosed = 4002,
    /// Session has outstanding due amount; close requires confirmation
    OutstandingBalance = 4003,

    // ==================== 5xxx: Order ====================
    /// Order not found (recoverable: caller may create a fresh order and retry)
    OrderNotFound = 5001,
    /// Order is no longer in cart state and cannot be mutated by the customer
    OrderLocked = 5002,
    /// Illegal state-machine move
    InvalidTransition = 5003,
    /// Order line not found
    LineNotFound = 5004,
    /// Order has no items
    OrderEmpty = 5005,

    // ==================== 6xxx: Capacity ====================
    /// Kitchen intake is paused
    KitchenPaused = 6001,
    /// Active order count is at the configured maximum
    CapacityExceeded = 6002,
    /// A category's active-item ceiling would be exceeded
    CategoryCapacityExceeded = 6003,

    // ==================== 7xxx: Table ====================
    /// Table not found (invalid or stale code)
    TableNotFound = 7001,
    /// Table is administratively disabled
    TableDisabled = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Storage error
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",

            Self::PermissionDenied => "Permission denied",
            Self::RoleRequired => "Role required for this operation",

            Self::InvalidToken => "Scanned code is not a valid table code",
            Self::MissingRestaurant => "No restaurant context for numeric table code",

            Self::SessionNotFound => "Session not found",
            Self::SessionClosed => "Session is closed",
            Self::OutstandingBalance => "Session has an outstanding balance",

            Self::OrderNotFound => "Order not found",
            Self::OrderLocked => "Order is already placed and locked",
            Self::InvalidTransition => "Illegal order status transition",
            Self::LineNotFound => "Order line not found",
            Self::OrderEmpty => "Order has no items",

            Self::KitchenPaused => "Kitchen is not accepting new orders right now",
            Self::CapacityExceeded => "Kitchen is busy, please try again shortly",
            Self::CategoryCapacityExceeded => "Too many pending items in this category",

            Self::TableNotFound => "Table not found",
            Self::TableDisabled => "Table is not available",

            Self::InternalError => "Internal server error",
            Self::StorageError => "Storage error",
        }
    }

    /// Get the HTTP status code for this error code
    pub fn http_status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed | Self::InvalidRequest | Self::InvalidToken => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingRestaurant => StatusCode::BAD_REQUEST,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            Self::PermissionDenied | Self::RoleRequired => StatusCode::FORBIDDEN,

            Self::NotFound
            | Self::SessionNotFound
            | Self::OrderNotFound
            | Self::LineNotFound
            | Self::TableNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists => StatusCode::CONFLICT,

            Self::SessionClosed
            | Self::OrderLocked
            | Self::InvalidTransition
            | Self::OrderEmpty
            | Self::OutstandingBalance
            | Self::TableDisabled => StatusCode::UNPROCESSABLE_ENTITY,

            // Admission rejections are advisory: the kitchen is busy, not broken
            Self::KitchenPaused | Self::CapacityExceeded | Self::CategoryCapacityExceeded => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            Self::Unknown | Self::InternalError | Self::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the caller may transparently retry after refreshing its
    /// cached order reference (the one-shot stale-reference recovery loop)
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, Self::OrderNotFound)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,

            1001 => Self::NotAuthenticated,
            1002 => Self::TokenExpired,
            1003 => Self::TokenInvalid,

            2001 => Self::PermissionDenied,
            2002 => Self::RoleRequired,

            3001 => Self::InvalidToken,
            3002 => Self::MissingRestaurant,

            4001 => Self::SessionNotFound,
            4002 => Self::SessionClosed,
            4003 => Self::OutstandingBalance,

            5001 => Self::OrderNotFound,
            5002 => Self::OrderLocked,
            5003 => Self::InvalidTransition,
            5004 => Self::LineNotFound,
            5005 => Self::OrderEmpty,

            6001 => Self::KitchenPaused,
            6002 => Self::CapacityExceeded,
            6003 => Self::CategoryCapacityExceeded,

            7001 => Self::TableNotFound,
            7002 => Self::TableDisabled,

            9001 => Self::InternalError,
            9002 => Self::StorageError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
