//! Feed subscription handlers

use axum::{
    Json,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::auth::StaffClaims;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::FeedEvent;

/// Display token response
#[derive(Debug, Serialize)]
pub struct DisplayTokenResponse {
    pub token: String,
}

/// Issue a short-lived display token from a staff access token
pub async fn issue_token(
    claims: StaffClaims,
    State(state): State<ServerState>,
) -> AppResult<Json<DisplayTokenResponse>> {
    let token = state
        .jwt_service
        .issue_display_token(&claims.0)
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Json(DisplayTokenResponse { token }))
}

/// Renewal request carrying the current (still valid) display token
#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    pub token: String,
}

/// Exchange a valid display token for a fresh one
pub async fn renew_token(
    State(state): State<ServerState>,
    Json(req): Json<RenewRequest>,
) -> AppResult<Json<DisplayTokenResponse>> {
    let claims = state
        .jwt_service
        .validate_display_token(&req.token)
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid))?;
    let token = state
        .jwt_service
        .issue_display_token(&claims)
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Json(DisplayTokenResponse { token }))
}

/// Subscribe query (EventSource cannot set headers, token goes in the URL)
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub token: String,
}

/// SSE stream of order events for the display's restaurant
///
/// At-most-once per connection: a lagged subscriber skips dropped events
/// and converges through the poll backstop.
pub async fn subscribe(
    State(state): State<ServerState>,
    Query(query): Query<SubscribeQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>>> {
    let claims = state
        .jwt_service
        .validate_display_token(&query.token)
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid))?;
    let restaurant_id = claims.restaurant_id;

    tracing::info!(
        subscriber = %claims.sub,
        restaurant_id,
        "Display subscribed to order feed"
    );

    let rx = state.feed.subscribe();
    let stream = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(delivered) => {
                    if delivered.event.snapshot().restaurant_id != restaurant_id {
                        continue;
                    }
                    match to_sse_event(&delivered) {
                        Some(sse) => return Some((Ok(sse), rx)),
                        None => continue,
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Feed subscriber lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// The sequence number rides along as the SSE event id, letting displays
/// spot gaps and trigger the backstop poll early
fn to_sse_event(delivered: &crate::feed::SequencedEvent) -> Option<Event> {
    let name = match &delivered.event {
        FeedEvent::OrderCreated { .. } => "order.created",
        FeedEvent::OrderUpdated { .. } => "order.updated",
    };
    match Event::default()
        .event(name)
        .id(delivered.sequence.to_string())
        .json_data(&delivered.event)
    {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize feed event");
            None
        }
    }
}
