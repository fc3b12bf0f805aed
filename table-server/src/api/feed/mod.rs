//! Feed API 模块
//!
//! 显示端订阅通道：员工令牌换取短时效订阅令牌，订阅令牌可续期
//! (reconnect-with-fresh-credentials)。推送本身是延迟优化；
//! `/api/orders/active` 轮询是正确性兜底。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/feed", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/token", post(handler::issue_token))
        .route("/renew", post(handler::renew_token))
        .route("/subscribe", get(handler::subscribe))
}
