use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub member_app: MemberApp,
    pub telegram: Telegram,
    pub database_webhook: DatabaseWebhook,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub project_url: Url,
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct MemberApp {
    pub base_url: Option<String>,
}

impl MemberApp {
    /// Where password-reset emails for already registered members land.
    pub fn password_reset_redirect(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}/reset-password", base.trim_end_matches('/')))
    }
}

#[derive(Debug, Clone)]
pub struct Telegram {
    pub bot_token: String,
    pub chat_id: String,
    pub default_send_time: String,
    pub autosend_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseWebhook {
    /// Webhook route answers 503 while unset.
    pub secret: Option<String>,
}
