use serde::Serialize;

/// Optional parts of the database schema, detected once at startup.
///
/// Older deployments were created before `approved_at`/`start_date` and the
/// link pool tables existed. Repositories consult this instead of reacting
/// to "column does not exist" errors on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaCapabilities {
    pub applicants_approved_at: bool,
    pub members_approved_at: bool,
    pub members_start_date: bool,
    pub zoom_links_table: bool,
    pub daily_zoom_links_table: bool,
    pub admin_settings_table: bool,
}

impl SchemaCapabilities {
    /// Every optional column and table present.
    pub fn full() -> Self {
        Self {
            applicants_approved_at: true,
            members_approved_at: true,
            members_start_date: true,
            zoom_links_table: true,
            daily_zoom_links_table: true,
            admin_settings_table: true,
        }
    }

    pub fn from_columns<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut capabilities = Self {
            applicants_approved_at: false,
            members_approved_at: false,
            members_start_date: false,
            zoom_links_table: false,
            daily_zoom_links_table: false,
            admin_settings_table: false,
        };

        for (table, column) in columns {
            match (table, column) {
                ("applicants", "approved_at") => capabilities.applicants_approved_at = true,
                ("members", "approved_at") => capabilities.members_approved_at = true,
                ("members", "start_date") => capabilities.members_start_date = true,
                ("zoom_links", _) => capabilities.zoom_links_table = true,
                ("daily_zoom_links", _) => capabilities.daily_zoom_links_table = true,
                ("admin_settings", _) => capabilities.admin_settings_table = true,
                _ => {}
            }
        }

        capabilities
    }

    pub fn link_pool_ready(&self) -> bool {
        self.zoom_links_table && self.daily_zoom_links_table
    }
}
