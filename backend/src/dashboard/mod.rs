pub mod change_feed;
pub mod events;
pub mod state;
pub mod store;
