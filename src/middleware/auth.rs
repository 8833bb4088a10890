use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role == "staff" || self.role == "admin"
    }
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Staff-or-admin guard for front-desk operations.
pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_and_admin_pass_the_staff_guard() {
        let staff = AuthUser {
            user_id: Uuid::new_v4(),
            role: "staff".into(),
        };
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: "admin".into(),
        };
        let guest = AuthUser {
            user_id: Uuid::new_v4(),
            role: "guest".into(),
        };
        assert!(ensure_staff(&staff).is_ok());
        assert!(ensure_staff(&admin).is_ok());
        assert!(matches!(ensure_staff(&guest), Err(AppError::Forbidden)));
        assert!(matches!(ensure_admin(&staff), Err(AppError::Forbidden)));
        assert!(ensure_admin(&admin).is_ok());
    }
}
