//! Request identity.
//!
//! Token verification happens at the edge proxy; by the time a request
//! reaches this service the authenticated subject is forwarded in the
//! `x-user-id` and `x-user-role` headers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Seller,
    Buyer,
}

impl Role {
    fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            "buyer" => Some(Role::Buyer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn can_manage_catalog(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Seller)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| AppError::Unauthorized("missing or invalid x-user-id".to_string()))?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse)
            .unwrap_or(Role::Buyer);

        Ok(AuthUser { id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("seller"), Some(Role::Seller));
        assert_eq!(Role::parse("buyer"), Some(Role::Buyer));
        assert_eq!(Role::parse("superuser"), None);
    }
}
