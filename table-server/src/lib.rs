//! Table Server - 桌边点餐与厨房调度服务
//!
//! # 架构概述
//!
//! The core of the table-side ordering platform:
//!
//! - **身份解析** (`identity`): 扫码令牌解析为 (restaurant, table)
//! - **会话管理** (`sessions`): 桌台占用检测与开台/结台
//! - **订单台账** (`orders`): 购物车增量变更、下单与状态机
//! - **容量控制** (`capacity`): 厨房准入与出餐时间估算
//! - **事件推送** (`feed`): 厨房/收银显示端的订单快照广播
//! - **结算** (`billing`): 按会话/分单聚合应付金额
//!
//! # 模块结构
//!
//! ```text
//! table-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── auth/          # JWT 认证、角色
//! ├── identity/      # 扫码令牌解析
//! ├── catalog/       # 菜单目录协作方接口
//! ├── sessions/      # 会话管理
//! ├── orders/        # 订单台账与状态机
//! ├── capacity/      # 容量控制
//! ├── billing/       # 结算
//! ├── feed/          # 订单事件广播
//! ├── ticket/        # 出票载荷
//! └── api/           # HTTP 路由和处理器
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod capacity;
pub mod catalog;
pub mod core;
pub mod feed;
pub mod identity;
pub mod orders;
pub mod sessions;
pub mod storage;
pub mod ticket;
pub mod utils;

// Re-export 公共类型
pub use auth::{JwtService, StaffClaims};
pub use capacity::CapacityController;
pub use core::{Config, Server, ServerState};
pub use feed::OrderFeed;
pub use orders::OrderLedger;
pub use sessions::SessionManager;
pub use storage::Storage;
pub use utils::{AppError, AppResult};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
  ______      __    __
 /_  __/___ _/ /_  / /__
  / / / __ `/ __ \/ / _ \
 / / / /_/ / /_/ / /  __/
/_/  \__,_/_.___/_/\___/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
