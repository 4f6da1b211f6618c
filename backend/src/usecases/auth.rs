use std::sync::Arc;

use crates::domain::{
    repositories::identity::IdentityProvider,
    value_objects::identity::{AuthSession, LoginModel},
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("invalid email or password")]
    InvalidCredentials,
}

impl LoginError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            LoginError::MissingCredentials => StatusCode::BAD_REQUEST,
            LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        }
    }
}

pub struct AuthUseCase<I>
where
    I: IdentityProvider + Send + Sync + 'static,
{
    identity: Arc<I>,
}

impl<I> AuthUseCase<I>
where
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    pub async fn login(&self, credentials: LoginModel) -> Result<AuthSession, LoginError> {
        let email = credentials.email.trim().to_string();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        match self
            .identity
            .sign_in_with_password(email.clone(), credentials.password)
            .await
        {
            Ok(session) => {
                info!(email = %email, "auth: signed in");
                Ok(session)
            }
            Err(err) => {
                warn!(email = %email, error = %err, "auth: sign in rejected");
                Err(LoginError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::identity::MockIdentityProvider;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn trims_email_before_signing_in() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in_with_password()
            .with(eq("admin@example.com".to_string()), eq("pw".to_string()))
            .returning(|_, _| {
                Ok(AuthSession {
                    access_token: "access".to_string(),
                    refresh_token: "refresh".to_string(),
                    token_type: "bearer".to_string(),
                    expires_in: 3600,
                })
            });

        let session = AuthUseCase::new(Arc::new(identity))
            .login(LoginModel {
                email: " admin@example.com ".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.access_token, "access");
    }

    #[tokio::test]
    async fn provider_errors_become_invalid_credentials() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in_with_password()
            .returning(|_, _| Err(anyhow::anyhow!("Invalid login credentials")));

        let err = AuthUseCase::new(Arc::new(identity))
            .login(LoginModel {
                email: "admin@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::InvalidCredentials));
    }
}
