//! Order Board API 模块
//!
//! 厨房/收银看板的轮询兜底接口与状态流转接口。状态流转需要员工
//! 令牌，角色限制在台账层检查（厨房只能出餐，收银才能结单/取消）。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Poll backstop for displays
        .route("/active", get(handler::active))
        // Customer-facing order status
        .route("/{id}", get(handler::get_by_id))
        // Staff transitions
        .route("/{id}/ready", post(handler::mark_ready))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/items/cancel", post(handler::cancel_item))
}
