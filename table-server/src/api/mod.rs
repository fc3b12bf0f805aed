//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`scan`] - 扫码开台接口
//! - [`cart`] - 购物车增量变更接口
//! - [`orders`] - 订单看板与状态流转接口
//! - [`capacity`] - 容量设置接口
//! - [`sessions`] - 会话结台接口
//! - [`tables`] - 桌台管理接口
//! - [`feed`] - 显示端订阅接口

pub mod capacity;
pub mod cart;
pub mod feed;
pub mod health;
pub mod orders;
pub mod scan;
pub mod sessions;
pub mod tables;

use crate::core::ServerState;
use axum::Router;

/// Assemble the full API router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(scan::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(capacity::router())
        .merge(sessions::router())
        .merge(tables::router())
        .merge(feed::router())
        .with_state(state)
}
