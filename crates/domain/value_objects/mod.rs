pub mod admin_settings;
pub mod capabilities;
pub mod enums;
pub mod identity;
pub mod member_activity;
pub mod members;
pub mod messaging;
pub mod zoom_links;
