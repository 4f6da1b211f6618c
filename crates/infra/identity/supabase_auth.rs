use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::{
    repositories::identity::IdentityProvider,
    value_objects::identity::{AuthSession, InviteOutcome},
};

#[derive(Debug, Clone)]
pub struct SupabaseAuthConfig {
    pub project_url: Url,
    pub anon_key: String,
    /// Needed for admin invites. Without it members get no login provisioned.
    pub service_role_key: Option<String>,
}

/// Thin client over the Supabase Auth (GoTrue) REST API.
pub struct SupabaseAuthClient {
    client: Client,
    config: SupabaseAuthConfig,
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueError {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default, alias = "error_description", alias = "message")]
    msg: Option<String>,
}

impl GoTrueError {
    fn is_already_registered(&self) -> bool {
        let code_matches = self
            .error_code
            .as_deref()
            .is_some_and(|code| code == "email_exists" || code == "user_already_exists");
        let message_matches = self
            .msg
            .as_deref()
            .is_some_and(|msg| msg.to_ascii_lowercase().contains("already"));
        code_matches || message_matches
    }

    fn describe(&self) -> String {
        self.msg
            .clone()
            .unwrap_or_else(|| "no error message".to_string())
    }
}

impl SupabaseAuthClient {
    pub fn new(config: SupabaseAuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build Supabase Auth http client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config
            .project_url
            .join(path)
            .with_context(|| format!("invalid Supabase Auth path: {path}"))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
    fn can_provision(&self) -> bool {
        self.config
            .service_role_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    async fn invite_user(&self, email: String, full_name: Option<String>) -> Result<InviteOutcome> {
        let service_key = self
            .config
            .service_role_key
            .as_deref()
            .ok_or_else(|| anyhow!("service role key is not configured"))?;

        let data = full_name.map(|name| json!({ "ho_ten": name }));
        let response = self
            .client
            .post(self.endpoint("auth/v1/invite")?)
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .json(&json!({ "email": email, "data": data }))
            .send()
            .await
            .context("invite request failed")?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "supabase_auth: invite accepted");
            return Ok(InviteOutcome::Invited);
        }

        let error: GoTrueError = response
            .json()
            .await
            .unwrap_or_default();

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY)
            && error.is_already_registered()
        {
            return Ok(InviteOutcome::AlreadyRegistered);
        }

        Err(anyhow!(
            "invite returned {}: {}",
            status,
            error.describe()
        ))
    }

    async fn send_password_reset(&self, email: String, redirect_to: String) -> Result<()> {
        let mut url = self.endpoint("auth/v1/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", &redirect_to);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .await
            .context("password reset request failed")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error: GoTrueError = response
            .json()
            .await
            .unwrap_or_default();
        Err(anyhow!(
            "password reset returned {}: {}",
            status,
            error.describe()
        ))
    }

    async fn sign_in_with_password(&self, email: String, password: String) -> Result<AuthSession> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("sign-in request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error: GoTrueError = response
                .json()
                .await
                .unwrap_or_default();
            return Err(anyhow!("sign-in returned {}: {}", status, error.describe()));
        }

        let session = response
            .json::<AuthSession>()
            .await
            .context("sign-in response was not a session")?;

        Ok(session)
    }
}
