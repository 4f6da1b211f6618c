pub mod admin_settings;
pub mod applicants;
pub mod auth;
pub mod daily_links;
pub mod dashboard;
pub mod inactivity_sweep;
pub mod member_activity;
pub mod members;
pub mod telegram_send;
