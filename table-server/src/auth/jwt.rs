//! JWT 令牌服务
//!
//! 处理访问令牌与显示端订阅令牌的生成、验证。

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::types::Role;
use thiserror::Error;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 签名密钥 (至少 32 字节)
    pub secret: String,
    /// 访问令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 显示端订阅令牌过期时间 (分钟, 短时效+可续期)
    pub display_token_minutes: i64,
    /// 签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            #[cfg(not(debug_assertions))]
            tracing::error!("JWT_SECRET not set, using development fallback key");
            "table-server-development-secret-key-32b".to_string()
        });
        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            display_token_minutes: std::env::var("DISPLAY_TOKEN_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "table-server".to_string()),
        }
    }
}

/// 令牌用途
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// 普通访问令牌
    Access,
    /// 显示端订阅令牌 (feed)
    Feed,
}

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 显示名
    pub name: String,
    /// 角色
    pub role: Role,
    /// 所属餐厅
    pub restaurant_id: i64,
    /// 令牌用途
    pub purpose: TokenPurpose,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
}

/// JWT 错误
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// 生成访问令牌
    pub fn issue_token(
        &self,
        sub: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        restaurant_id: i64,
    ) -> Result<String, JwtError> {
        self.issue(
            sub.into(),
            name.into(),
            role,
            restaurant_id,
            TokenPurpose::Access,
            self.config.expiration_minutes,
        )
    }

    /// 生成显示端订阅令牌 (短时效)
    ///
    /// 订阅端通过续期接口携带旧令牌换取新令牌，实现
    /// reconnect-with-fresh-credentials。
    pub fn issue_display_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.issue(
            claims.sub.clone(),
            claims.name.clone(),
            claims.role,
            claims.restaurant_id,
            TokenPurpose::Feed,
            self.config.display_token_minutes,
        )
    }

    fn issue(
        &self,
        sub: String,
        name: String,
        role: Role,
        restaurant_id: i64,
        purpose: TokenPurpose,
        minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            name,
            role,
            restaurant_id,
            purpose,
            exp: now + minutes * 60,
            iat: now,
            iss: self.config.issuer.clone(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证令牌并返回 Claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            _ => JwtError::InvalidToken(e.to_string()),
        })
    }

    /// 验证显示端订阅令牌 (必须为 Feed 用途)
    pub fn validate_display_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.purpose != TokenPurpose::Feed {
            return Err(JwtError::InvalidToken(
                "not a display subscription token".to_string(),
            ));
        }
        Ok(claims)
    }

    /// 从 `Authorization: Bearer <token>` 头中提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new(JwtConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-unit-tests-only!!".to_string(),
            expiration_minutes: 60,
            display_token_minutes: 15,
            issuer: "test".to_string(),
        })
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let svc = service();
        let token = svc.issue_token("u1", "Kitchen One", Role::Kitchen, 1).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, Role::Kitchen);
        assert_eq!(claims.restaurant_id, 1);
        assert_eq!(claims.purpose, TokenPurpose::Access);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.issue_token("u1", "User", Role::Cashier, 1).unwrap();
        let tampered = format!("{}x", token);
        assert!(matches!(
            svc.validate_token(&tampered),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_display_token_purpose_enforced() {
        let svc = service();
        let access = svc.issue_token("u1", "User", Role::Kitchen, 1).unwrap();
        // Access tokens are not valid on the feed
        assert!(svc.validate_display_token(&access).is_err());

        let claims = svc.validate_token(&access).unwrap();
        let display = svc.issue_display_token(&claims).unwrap();
        let feed_claims = svc.validate_display_token(&display).unwrap();
        assert_eq!(feed_claims.purpose, TokenPurpose::Feed);
        // Renewal: a valid display token yields a fresh one
        let renewed = svc.issue_display_token(&feed_claims).unwrap();
        assert!(svc.validate_display_token(&renewed).is_ok());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic xyz"), None);
    }
}
