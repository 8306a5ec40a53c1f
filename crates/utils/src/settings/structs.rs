use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, SmartDefault)]
#[serde(default)]
pub struct Settings {
  /// settings related to the sqlite database
  #[default(Default::default())]
  pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, SmartDefault)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
  /// Path of the sqlite database file, or a `file:` URI
  #[default("chirp.sqlite3")]
  pub connection: String,

  /// Maximum number of active sql connections
  #[default(5)]
  pub pool_size: usize,
}
