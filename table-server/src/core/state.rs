//! 服务器状态 - 持有所有服务的共享引用
//!
//! ServerState 是核心数据结构，通过 Arc 浅拷贝在所有 handler 之间共享。
//!
//! # 服务组件
//!
//! | 字段 | 说明 |
//! |------|------|
//! | config | 配置项 (不可变) |
//! | storage | redb 嵌入式存储 |
//! | sessions | 会话管理 |
//! | ledger | 订单台账 |
//! | capacity | 容量控制 |
//! | feed | 订单事件广播 |
//! | jwt_service | JWT 认证服务 |
//! | catalog | 菜单目录协作方 |

use std::sync::Arc;

use crate::auth::JwtService;
use crate::capacity::CapacityController;
use crate::catalog::{CatalogRef, StaticCatalog};
use crate::core::Config;
use crate::feed::OrderFeed;
use crate::orders::OrderLedger;
use crate::sessions::SessionManager;
use crate::storage::Storage;
use crate::ticket::{LogTicketSink, TicketSink};

/// 服务器状态
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式存储
    pub storage: Storage,
    /// 会话管理
    pub sessions: Arc<SessionManager>,
    /// 订单台账
    pub ledger: Arc<OrderLedger>,
    /// 容量控制
    pub capacity: Arc<CapacityController>,
    /// 订单事件广播
    pub feed: OrderFeed,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 菜单目录 (可变, 供管理端同步)
    pub catalog: Arc<StaticCatalog>,
}

impl ServerState {
    /// 初始化服务器状态 (文件存储)
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");
        let storage = Storage::open(config.database_path()).expect("Failed to open database");
        Self::with_storage(config.clone(), storage)
    }

    /// 从给定存储构造 (测试与内存部署)
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let catalog = Arc::new(StaticCatalog::new());
        let feed = OrderFeed::new();
        let tickets: Arc<dyn TicketSink> = Arc::new(LogTicketSink);
        let capacity = Arc::new(CapacityController::new(storage.clone()));
        let sessions = Arc::new(SessionManager::new(storage.clone(), tickets.clone()));
        let ledger = Arc::new(OrderLedger::new(
            storage.clone(),
            catalog.clone() as CatalogRef,
            capacity.clone(),
            feed.clone(),
            tickets,
        ));
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            config,
            storage,
            sessions,
            ledger,
            capacity,
            feed,
            jwt_service,
            catalog,
        }
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
