pub mod applicants;
pub mod auth;
pub mod dashboard;
pub mod maintenance;
pub mod members;
pub mod settings;
pub mod webhooks;
pub mod zoom_links;

#[cfg(test)]
pub(crate) mod test_support;

use chrono::{Local, NaiveDate};

/// Program days follow the server's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
