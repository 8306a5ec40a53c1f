pub mod schema;
pub mod schema_setup;
