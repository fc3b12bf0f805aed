//! Common types for the shared crate

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Restaurant identifier
pub type RestaurantId = i64;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Staff/customer role supplied by the authentication collaborator
///
/// Roles authorize state-machine transitions and settings mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Kitchen,
    Cashier,
    Manager,
    Owner,
}

impl Role {
    /// Staff roles (everything except customer)
    pub fn is_staff(&self) -> bool {
        !matches!(self, Self::Customer)
    }

    /// Whether this role may mutate capacity settings
    pub fn can_manage_settings(&self) -> bool {
        matches!(self, Self::Manager | Self::Owner)
    }

    /// Whether this role may perform the `accepted → ready` transition
    pub fn can_mark_ready(&self) -> bool {
        matches!(self, Self::Kitchen | Self::Manager | Self::Owner)
    }

    /// Whether this role may complete orders and close sessions
    pub fn can_settle(&self) -> bool {
        matches!(self, Self::Cashier | Self::Manager | Self::Owner)
    }

    /// Whether this role may cancel orders or order lines post-placement
    ///
    /// Kitchen boards may only mark orders ready; cancellation is a
    /// cashier/manager action.
    pub fn can_cancel(&self) -> bool {
        matches!(self, Self::Cashier | Self::Manager | Self::Owner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Customer => "CUSTOMER",
            Self::Kitchen => "KITCHEN",
            Self::Cashier => "CASHIER",
            Self::Manager => "MANAGER",
            Self::Owner => "OWNER",
        };
        write!(f, "{}", s)
    }
}
