//! Bounded retry for stale order references
//!
//! A client that cached an `order_id` may find it gone: the session was
//! reset, or the order was finalized and a fresh cart should start. The
//! ledger signals this as `OrderNotFound`; this combinator is the single
//! place that turns it into "drop the cached id, retry once". Every call
//! site goes through here, so the one-retry cap is enforced uniformly and
//! can never become an infinite loop.

use shared::AppResult;

/// Run `op` with the caller's cached order reference, retrying exactly once
/// without it when the reference turns out stale.
///
/// `op` receives `Some(order_id)` on the first attempt (when the caller
/// holds one) and `None` on the retry, letting the ledger resolve or
/// create a fresh cart order.
pub fn with_fresh_order<T>(
    cached_order_id: Option<String>,
    mut op: impl FnMut(Option<&str>) -> AppResult<T>,
) -> AppResult<T> {
    let first = op(cached_order_id.as_deref());
    match first {
        Err(err) if err.is_stale_reference() && cached_order_id.is_some() => {
            tracing::debug!(
                stale_order_id = cached_order_id.as_deref(),
                "Cached order reference is stale, retrying with a fresh order"
            );
            op(None)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AppError, ErrorCode};

    #[test]
    fn test_success_passes_through() {
        let mut calls = 0;
        let result = with_fresh_order(Some("o1".to_string()), |hint| {
            calls += 1;
            assert_eq!(hint, Some("o1"));
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_stale_reference_retries_once_without_hint() {
        let mut calls = 0;
        let result = with_fresh_order(Some("gone".to_string()), |hint| {
            calls += 1;
            match hint {
                Some(_) => Err(AppError::order_not_found("gone")),
                None => Ok("fresh"),
            }
        });
        assert_eq!(result.unwrap(), "fresh");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_retry_is_capped_at_one() {
        let mut calls = 0;
        let result: AppResult<()> = with_fresh_order(Some("gone".to_string()), |_| {
            calls += 1;
            Err(AppError::order_not_found("gone"))
        });
        assert_eq!(result.unwrap_err().code, ErrorCode::OrderNotFound);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_no_cached_reference_never_retries() {
        let mut calls = 0;
        let result: AppResult<()> = with_fresh_order(None, |_| {
            calls += 1;
            Err(AppError::order_not_found("none"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_other_errors_never_retry() {
        let mut calls = 0;
        let result: AppResult<()> = with_fresh_order(Some("o1".to_string()), |_| {
            calls += 1;
            Err(AppError::new(ErrorCode::KitchenPaused))
        });
        assert_eq!(result.unwrap_err().code, ErrorCode::KitchenPaused);
        assert_eq!(calls, 1);
    }
}
