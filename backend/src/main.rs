use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use crates::domain::value_objects::capabilities::SchemaCapabilities;
use crates::infra::db::postgres::{capabilities::probe_capabilities, postgres_connection};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
    )?);
    info!("Postgres connection has been established");

    let probe_pool = Arc::clone(&postgres_pool);
    let capabilities = match tokio::task::spawn_blocking(move || probe_capabilities(probe_pool))
        .await?
    {
        Ok(capabilities) => {
            info!(?capabilities, "Schema capabilities probed");
            capabilities
        }
        Err(err) => {
            warn!(error = ?err, "Schema probe failed; assuming a fully migrated schema");
            SchemaCapabilities::full()
        }
    };

    http_serve::start(Arc::new(dotenvy_env), postgres_pool, capabilities).await?;

    Ok(())
}
