//! Authentication and role gating
//!
//! The identity collaborator supplies each caller's role; this module
//! verifies the JWT it issued and exposes the claims to handlers. Display
//! clients (kitchen/cashier boards) use short-lived, renewable feed tokens
//! for the subscription channel.

mod extractor;
mod jwt;

pub use extractor::StaffClaims;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenPurpose};
