//! Capacity Settings API 模块
//!
//! 读取对所有员工开放，写入仅限有设置权限的角色。

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/capacity",
        get(handler::get_settings).put(handler::update_settings),
    )
}
