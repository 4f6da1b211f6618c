use std::sync::Arc;

use anyhow::{Context, Result};
use diesel::{QueryableByName, RunQueryDsl, sql_query, sql_types::Text};
use tracing::{info, warn};

use crate::domain::value_objects::capabilities::SchemaCapabilities;
use crate::infra::db::postgres::postgres_connection::PgPoolSquad;

#[derive(Debug, QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
}

const PROBE_QUERY: &str = "SELECT table_name::text AS table_name, column_name::text AS column_name \
     FROM information_schema.columns \
     WHERE table_schema = 'public' \
       AND table_name IN ('applicants', 'members', 'zoom_links', 'daily_zoom_links', 'admin_settings')";

pub fn probe_capabilities(db_pool: Arc<PgPoolSquad>) -> Result<SchemaCapabilities> {
    let mut conn = db_pool.get()?;

    let rows = sql_query(PROBE_QUERY)
        .load::<ColumnRow>(&mut conn)
        .context("failed to read information_schema.columns")?;

    let capabilities = SchemaCapabilities::from_columns(
        rows.iter()
            .map(|row| (row.table_name.as_str(), row.column_name.as_str())),
    );

    if !capabilities.applicants_approved_at || !capabilities.members_approved_at {
        warn!(
            applicants_approved_at = capabilities.applicants_approved_at,
            members_approved_at = capabilities.members_approved_at,
            "capabilities: approved_at column missing; approvals will not record a timestamp"
        );
    }
    if !capabilities.link_pool_ready() {
        warn!("capabilities: zoom link tables missing; run the link pool SQL setup");
    }
    if !capabilities.admin_settings_table {
        warn!("capabilities: admin_settings table missing; settings fall back to defaults");
    }

    info!(?capabilities, "capabilities: schema probe complete");

    Ok(capabilities)
}
