//! JWT extractor for staff-facing handlers

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{Claims, JwtService, TokenPurpose};
use crate::core::ServerState;
use crate::security_log;
use shared::types::Role;
use shared::{AppError, ErrorCode};

/// Authenticated staff claims
///
/// Use as a handler argument to require a valid access token; role checks
/// go through [`StaffClaims::require`].
#[derive(Debug, Clone)]
pub struct StaffClaims(pub Claims);

impl StaffClaims {
    /// Enforce a role predicate, e.g. `claims.require(Role::can_settle)`
    pub fn require(&self, check: fn(&Role) -> bool) -> Result<(), AppError> {
        if check(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::PermissionDenied,
                format!("Role {} may not perform this operation", self.0.role),
            ))
        }
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn restaurant_id(&self) -> i64 {
        self.0.restaurant_id
    }
}

impl FromRequestParts<ServerState> for StaffClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted earlier in the request
        if let Some(claims) = parts.extensions.get::<StaffClaims>() {
            return Ok(claims.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header).ok_or_else(|| {
                AppError::with_message(ErrorCode::TokenInvalid, "Invalid authorization header")
            })?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::not_authenticated());
            }
        };

        match state.jwt_service.validate_token(token) {
            Ok(claims) if claims.purpose == TokenPurpose::Access => {
                let staff = StaffClaims(claims);
                parts.extensions.insert(staff.clone());
                Ok(staff)
            }
            Ok(_) => Err(AppError::with_message(
                ErrorCode::TokenInvalid,
                "Feed tokens are not valid for API access",
            )),
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                match e {
                    crate::auth::JwtError::ExpiredToken => {
                        Err(AppError::new(ErrorCode::TokenExpired))
                    }
                    _ => Err(AppError::new(ErrorCode::TokenInvalid)),
                }
            }
        }
    }
}
