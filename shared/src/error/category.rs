//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Scan/identity errors
/// - 4xxx: Session errors
/// - 5xxx: Order errors
/// - 6xxx: Capacity errors
/// - 7xxx: Table errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Scan/identity errors (3xxx)
    Scan,
    /// Session errors (4xxx)
    Session,
    /// Order errors (5xxx)
    Order,
    /// Capacity errors (6xxx)
    Capacity,
    /// Table errors (7xxx)
    Table,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Scan,
            4000..5000 => Self::Session,
            5000..6000 => Self::Order,
            6000..7000 => Self::Capacity,
            7000..8000 => Self::Table,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Scan => "scan",
            Self::Session => "session",
            Self::Order => "order",
            Self::Capacity => "capacity",
            Self::Table => "table",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Scan);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Session);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(6002), ErrorCategory::Capacity);
        assert_eq!(ErrorCategory::from_code(7002), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::InvalidToken.category(), ErrorCategory::Scan);
        assert_eq!(ErrorCode::SessionClosed.category(), ErrorCategory::Session);
        assert_eq!(ErrorCode::OrderNotFound.category(), ErrorCategory::Order);
        assert_eq!(
            ErrorCode::KitchenPaused.category(),
            ErrorCategory::Capacity
        );
        assert_eq!(ErrorCode::TableDisabled.category(), ErrorCategory::Table);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Capacity).unwrap();
        assert_eq!(json, "\"capacity\"");
        let category: ErrorCategory = serde_json::from_str("\"order\"").unwrap();
        assert_eq!(category, ErrorCategory::Order);
    }
}
