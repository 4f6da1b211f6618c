use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use crates::domain::{
    repositories::identity::IdentityProvider, value_objects::identity::LoginModel,
};

use crate::{axum_http::error_responses::error_response, usecases::auth::AuthUseCase};

pub fn routes<I>(usecase: Arc<AuthUseCase<I>>) -> Router
where
    I: IdentityProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(login::<I>))
        .with_state(usecase)
}

pub async fn login<I>(
    State(usecase): State<Arc<AuthUseCase<I>>>,
    Json(credentials): Json<LoginModel>,
) -> Response
where
    I: IdentityProvider + Send + Sync + 'static,
{
    match usecase.login(credentials).await {
        Ok(session) => Json(session).into_response(),
        Err(err) => error_response("auth", err),
    }
}
