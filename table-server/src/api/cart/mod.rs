//! Cart API 模块
//!
//! 购物车增量变更：无需权限（顾客入口）。每个变更都是对
//! `(menu_item, variant)` 键的增量，响应返回当前购物车快照。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/items", post(handler::add_item))
        .route("/items/decrement", post(handler::decrement_item))
        .route("/items/remove", post(handler::remove_item))
        .route("/finalize", post(handler::finalize))
        .route("/takeaway", post(handler::create_takeaway))
}
