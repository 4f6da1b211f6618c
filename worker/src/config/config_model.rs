#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub telegram: Telegram,
    pub schedule: Schedule,
    pub internal: Internal,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Telegram {
    pub bot_token: String,
    pub chat_id: String,
    pub default_send_time: String,
    pub autosend_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    pub poll_seconds: u64,
    pub inactivity_sweep_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Internal {
    /// Bearer token for `/internal/v1/*`; the routes answer 503 without it.
    pub token: Option<String>,
}
