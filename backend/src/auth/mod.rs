use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    pub role: String,
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

/// Verifies Supabase access tokens. Built once from config and shared with
/// handlers through a request extension.
#[derive(Clone)]
pub struct SupabaseJwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SupabaseJwtValidator {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["authenticated", "service_role"]);

        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> anyhow::Result<SupabaseClaims> {
        let token_data = decode::<SupabaseClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

        Ok(token_data.claims)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, (StatusCode, String)> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        )
    })?;

    auth_str.strip_prefix("Bearer ").ok_or((
        StatusCode::UNAUTHORIZED,
        "Invalid Authorization header format".to_string(),
    ))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let validator = parts
            .extensions
            .get::<Arc<SupabaseJwtValidator>>()
            .cloned()
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Token validator is not configured".to_string(),
            ))?;

        let token = bearer_token(parts)?;

        let claims = validator.validate(token).map_err(|e| {
            debug!(error = %e, "auth: rejected bearer token");
            (StatusCode::UNAUTHORIZED, e.to_string())
        })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid user ID in token".to_string(),
            )
        })?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
