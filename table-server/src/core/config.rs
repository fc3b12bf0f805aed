//! 服务器配置
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/table-server | 工作目录 (数据库、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | DEFAULT_RESTAURANT_ID | 1 | 单店部署的默认餐厅 ID |
//! | JWT_SECRET | (dev fallback) | JWT 签名密钥 |

use crate::auth::JwtConfig;
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 单店部署时用于数字桌码解析的默认餐厅 ID
    pub default_restaurant_id: i64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置，未设置时使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/table-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            default_restaurant_id: std::env::var("DEFAULT_RESTAURANT_ID")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
            jwt: JwtConfig::default(),
        }
    }

    /// 数据库文件路径 (work_dir/database/table-server.redb)
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("table-server.redb")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("database"))?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
