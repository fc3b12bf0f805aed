//! Order status transition authorization
//!
//! Combines the state-machine legality table with role gating: a move must
//! be legal for the order AND permitted for the caller's role. A stale
//! transition (e.g. a "mark ready" arriving after completion) fails the
//! legality check and is rejected, never silently reapplied.

use shared::order::OrderStatus;
use shared::types::Role;
use shared::{AppError, AppResult, ErrorCode};

/// Validate `from → to` for the given caller role
pub fn authorize_transition(role: Role, from: OrderStatus, to: OrderStatus) -> AppResult<()> {
    if !from.can_transition_to(to) {
        return Err(AppError::invalid_transition(
            from.to_string(),
            to.to_string(),
        ));
    }

    let allowed = match to {
        // Finalize is the customer's own act; staff may place on behalf
        OrderStatus::Accepted => true,
        OrderStatus::Ready => role.can_mark_ready(),
        OrderStatus::Completed => role.can_settle(),
        OrderStatus::Cancelled => role.can_cancel(),
        OrderStatus::Cart => false,
    };

    if !allowed {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Role {} may not move an order to {}", role, to),
        )
        .with_detail("role", role.to_string())
        .with_detail("to", to.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_may_only_mark_ready() {
        assert!(
            authorize_transition(Role::Kitchen, OrderStatus::Accepted, OrderStatus::Ready).is_ok()
        );
        let err =
            authorize_transition(Role::Kitchen, OrderStatus::Ready, OrderStatus::Completed)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
        let err =
            authorize_transition(Role::Kitchen, OrderStatus::Accepted, OrderStatus::Cancelled)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
    }

    #[test]
    fn test_cashier_settles_and_cancels() {
        assert!(
            authorize_transition(Role::Cashier, OrderStatus::Ready, OrderStatus::Completed)
                .is_ok()
        );
        assert!(
            authorize_transition(Role::Cashier, OrderStatus::Accepted, OrderStatus::Cancelled)
                .is_ok()
        );
        let err =
            authorize_transition(Role::Cashier, OrderStatus::Accepted, OrderStatus::Ready)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
    }

    #[test]
    fn test_illegal_moves_beat_role_checks() {
        // Even a manager cannot move backward
        let err = authorize_transition(Role::Manager, OrderStatus::Ready, OrderStatus::Accepted)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        // Stale mark-ready after completion is rejected
        let err =
            authorize_transition(Role::Kitchen, OrderStatus::Completed, OrderStatus::Ready)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_exhaustive_legality_table() {
        use OrderStatus::*;
        let legal = [
            (Cart, Accepted),
            (Accepted, Ready),
            (Ready, Completed),
            (Cart, Cancelled),
            (Accepted, Cancelled),
        ];
        for from in [Cart, Accepted, Ready, Completed, Cancelled] {
            for to in [Cart, Accepted, Ready, Completed, Cancelled] {
                let expect_legal = legal.contains(&(from, to));
                let result = authorize_transition(Role::Owner, from, to);
                if expect_legal {
                    assert!(result.is_ok(), "{from} -> {to} should be legal");
                } else {
                    assert_eq!(
                        result.unwrap_err().code,
                        ErrorCode::InvalidTransition,
                        "{from} -> {to} should be illegal"
                    );
                }
            }
        }
    }
}
