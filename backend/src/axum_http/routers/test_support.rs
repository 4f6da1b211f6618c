use std::sync::Arc;

use axum::{
    Extension, Router,
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::auth::SupabaseJwtValidator;

const JWT_SECRET: &str = "router-tests-jwt-secret-0123456789";

fn admin_token() -> String {
    let claims = json!({
        "sub": "123e4567-e89b-12d3-a456-426614174000",
        "role": "authenticated",
        "aud": "authenticated",
        "email": "admin@example.com",
        "exp": 9999999999usize,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Sends one JSON request through `router` as a signed-in admin.
pub async fn send_json(router: Router, method: Method, uri: &str, body: Value) -> Response {
    let app = router.layer(Extension(Arc::new(SupabaseJwtValidator::new(JWT_SECRET))));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", admin_token()))
        .body(Body::from(body.to_string()))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub fn assert_needs_confirmation(response: &Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
