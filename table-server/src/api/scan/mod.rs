//! Table Scan API 模块
//!
//! 扫码开台：无需权限（顾客入口）。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/scan", post(handler::scan))
}
