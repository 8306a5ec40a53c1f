use anyhow::anyhow;
use chirp_utils::error::{ChirpErrorExt, ChirpErrorType, ChirpResult};
use diesel::{
  migration::{Migration, MigrationVersion},
  sqlite::Sqlite,
  Connection,
  SqliteConnection,
};
use diesel_migrations::MigrationHarness;
use std::time::Instant;
use tracing::debug;

fn migrations() -> diesel_migrations::EmbeddedMigrations {
  // Using `const` here is required by the borrow checker
  const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("../../migrations");
  MIGRATIONS
}

struct MigrationHarnessWrapper<'a> {
  conn: &'a mut SqliteConnection,
  options: &'a Options,
}

impl MigrationHarness<Sqlite> for MigrationHarnessWrapper<'_> {
  fn run_migration(
    &mut self,
    migration: &dyn Migration<Sqlite>,
  ) -> diesel::migration::Result<MigrationVersion<'static>> {
    let start_time = Instant::now();

    let result = self.conn.run_migration(migration);

    let duration = start_time.elapsed();
    let name = migration.name();
    self.options.print(&format!("{duration:?} run {name}"));

    result
  }

  fn revert_migration(
    &mut self,
    migration: &dyn Migration<Sqlite>,
  ) -> diesel::migration::Result<MigrationVersion<'static>> {
    let start_time = Instant::now();

    let result = self.conn.revert_migration(migration);

    let duration = start_time.elapsed();
    let name = migration.name();
    self.options.print(&format!("{duration:?} revert {name}"));

    result
  }

  fn applied_migrations(&mut self) -> diesel::migration::Result<Vec<MigrationVersion<'static>>> {
    self.conn.applied_migrations()
  }
}

#[derive(Default, Clone, Copy)]
pub struct Options {
  revert: bool,
  run: bool,
  print_output: bool,
  limit: Option<u64>,
}

impl Options {
  pub fn run(mut self) -> Self {
    self.run = true;
    self
  }

  pub fn revert(mut self) -> Self {
    self.revert = true;
    self
  }

  pub fn limit(mut self, limit: u64) -> Self {
    self.limit = Some(limit);
    self
  }

  /// If print_output is true, use println!.
  /// Otherwise, use debug!
  pub fn print_output(mut self) -> Self {
    self.print_output = true;
    self
  }

  fn print(&self, text: &str) {
    if self.print_output {
      println!("{text}");
    } else {
      debug!("{text}");
    }
  }
}

/// Applies or reverts the embedded migrations on the database at `db_url`.
pub fn run(options: Options, db_url: &str) -> ChirpResult<()> {
  // Migrations don't support async connection, and this function doesn't need to be async
  let mut conn = SqliteConnection::establish(db_url)?;

  options.print("Running Database migrations...");

  run_selected_migrations(&mut conn, &options)
    .map_err(convert_err)
    .with_chirp_type(ChirpErrorType::CouldntRunMigrations)?;

  options.print("Database migrations complete.");

  Ok(())
}

/// Whether `db_url` still has migrations that were never applied.
pub fn has_pending_migrations(db_url: &str) -> ChirpResult<bool> {
  let mut conn = SqliteConnection::establish(db_url)?;
  Ok(
    conn
      .has_pending_migration(migrations())
      .map_err(convert_err)?,
  )
}

fn run_selected_migrations(
  conn: &mut SqliteConnection,
  options: &Options,
) -> diesel::migration::Result<()> {
  let mut wrapper = MigrationHarnessWrapper { conn, options };

  if options.revert {
    if let Some(limit) = options.limit {
      for _ in 0..limit {
        wrapper.revert_last_migration(migrations())?;
      }
    } else {
      wrapper.revert_all_migrations(migrations())?;
    }
  }

  if options.run {
    if let Some(limit) = options.limit {
      for _ in 0..limit {
        wrapper.run_next_migration(migrations())?;
      }
    } else {
      wrapper.run_pending_migrations(migrations())?;
    }
  }

  Ok(())
}

/// Makes `diesel::migration::Result` work with `anyhow` and `ChirpError`
fn convert_err(e: Box<dyn std::error::Error + Send + Sync>) -> anyhow::Error {
  anyhow!(e)
}
