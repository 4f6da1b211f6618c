pub mod db;
pub mod identity;
pub mod messaging;
