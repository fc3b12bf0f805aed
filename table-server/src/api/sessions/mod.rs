//! Session API 模块
//!
//! 应付金额查询对顾客开放（查自己的账单），结台需要收银角色。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/due", get(handler::due))
        .route("/{id}/close", post(handler::close))
}
