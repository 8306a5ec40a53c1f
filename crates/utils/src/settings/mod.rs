use crate::{error::ChirpResult, settings::structs::Settings};
use deser_hjson::from_str;
use std::{env, fs, io::ErrorKind, sync::LazyLock};
use tracing::debug;

pub mod structs;

static DEFAULT_CONFIG_FILE: &str = "config/config.hjson";

#[allow(clippy::expect_used)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(|| {
  Settings::init().expect("Failed to load settings file, see config/config.hjson for an example")
});

impl Settings {
  /// Reads config from the file at `CHIRP_CONFIG_LOCATION` (or `config/config.hjson`).
  ///
  /// A missing file is not an error, all fields then take their default values.
  pub fn init() -> ChirpResult<Self> {
    match fs::read_to_string(Self::get_config_location()) {
      Ok(config) => Self::from_hjson(&config),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!("No config file found, using default settings");
        Ok(Settings::default())
      }
      Err(e) => Err(e.into()),
    }
  }

  pub fn from_hjson(config: &str) -> ChirpResult<Self> {
    Ok(from_str::<Settings>(config)?)
  }

  /// The database to connect to. `CHIRP_DATABASE_URL` takes precedence over the config file.
  pub fn get_database_url(&self) -> String {
    env::var("CHIRP_DATABASE_URL").unwrap_or_else(|_| self.database.connection.clone())
  }

  pub fn get_config_location() -> String {
    env::var("CHIRP_CONFIG_LOCATION").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
  }
}
