pub mod capabilities;
pub mod postgres_connection;
pub mod schema;
