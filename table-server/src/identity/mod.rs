//! Scan token resolution
//!
//! Turns a scanned code plus optional caller-held context into a canonical
//! table target. Two token shapes exist in the wild:
//!
//! - a plain decimal table number, optionally prefixed with a single
//!   non-digit marker printed on older table cards (`"T7"` → `7`)
//! - an opaque UUID-shaped table identifier from newer QR codes
//!
//! Resolution never guesses: a numeric token without restaurant context is
//! `MissingRestaurant`, anything else unrecognizable is `InvalidToken`.

use shared::session::SessionContext;
use shared::{AppError, AppResult, ErrorCode};

/// Canonical target of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Numeric table address inside a known restaurant
    Numeric { restaurant_id: i64, table_number: i64 },
    /// Opaque table identifier (self-contained, no context needed)
    Opaque { table_id: String },
}

/// Resolve a scanned token against optional caller-held context
pub fn resolve_scan(token: &str, context: Option<&SessionContext>) -> AppResult<ResolvedTarget> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::new(ErrorCode::InvalidToken));
    }

    // Strip a single leading non-digit marker ("T7", "#12")
    let normalized = strip_marker(token);

    if normalized.chars().all(|c| c.is_ascii_digit()) {
        let table_number: i64 = normalized
            .parse()
            .map_err(|_| AppError::new(ErrorCode::InvalidToken))?;
        let restaurant_id = context
            .and_then(|ctx| ctx.restaurant_id)
            .ok_or_else(|| AppError::new(ErrorCode::MissingRestaurant))?;
        return Ok(ResolvedTarget::Numeric {
            restaurant_id,
            table_number,
        });
    }

    if uuid::Uuid::parse_str(token).is_ok() {
        return Ok(ResolvedTarget::Opaque {
            table_id: token.to_string(),
        });
    }

    Err(AppError::with_message(
        ErrorCode::InvalidToken,
        format!("Unrecognized table code: {}", token),
    ))
}

/// Strip a single leading non-digit marker from an otherwise numeric token
fn strip_marker(token: &str) -> &str {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() => {
            let rest = chars.as_str();
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                rest
            } else {
                token
            }
        }
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(restaurant_id: i64) -> SessionContext {
        SessionContext {
            restaurant_id: Some(restaurant_id),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_token_with_context() {
        let target = resolve_scan("7", Some(&ctx(1))).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Numeric {
                restaurant_id: 1,
                table_number: 7
            }
        );
    }

    #[test]
    fn test_marker_prefix_is_stripped() {
        let target = resolve_scan("T12", Some(&ctx(3))).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Numeric {
                restaurant_id: 3,
                table_number: 12
            }
        );
    }

    #[test]
    fn test_numeric_token_without_context_fails() {
        let err = resolve_scan("7", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRestaurant);

        let empty_ctx = SessionContext::default();
        let err = resolve_scan("7", Some(&empty_ctx)).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRestaurant);
    }

    #[test]
    fn test_opaque_token_needs_no_context() {
        let id = uuid::Uuid::new_v4().to_string();
        let target = resolve_scan(&id, None).unwrap();
        assert_eq!(target, ResolvedTarget::Opaque { table_id: id });
    }

    #[test]
    fn test_garbage_token_rejected() {
        for bad in ["", "tbl-7x", "TT7", "7seven", "not-a-uuid-at-all"] {
            let err = resolve_scan(bad, Some(&ctx(1))).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidToken, "token: {:?}", bad);
        }
    }
}
