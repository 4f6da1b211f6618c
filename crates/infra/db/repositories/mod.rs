pub mod admin_settings;
pub mod applicants;
pub mod member_activity;
pub mod members;
pub mod zoom_links;
