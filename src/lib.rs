//! The chirp server crate
#![deny(missing_docs)]

use chirp_db_schema_file::schema_setup;
use chirp_diesel_utils::connection::{build_db_pool, get_conn};
use chirp_utils::{error::ChirpResult, settings::SETTINGS};
use clap::{Parser, Subcommand};
use tracing::info;

/// Persistence layer for a small social network: users, posts, comments, likes and followers.
///
/// Settings are read from the hjson file named by `CHIRP_CONFIG_LOCATION`, and
/// `CHIRP_DATABASE_URL` overrides the configured database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CmdArgs {
  #[command(subcommand)]
  subcommand: Option<CmdSubcommand>,
}

#[derive(Subcommand, Debug)]
enum CmdSubcommand {
  /// Do something with migrations, then exit.
  Migration {
    #[command(subcommand)]
    subcommand: MigrationSubcommand,
    /// Stop after there's no remaining migrations.
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Stop after the given number of migrations.
    #[arg(long, default_value_t = 1)]
    number: u64,
  },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum MigrationSubcommand {
  /// Run up.sql for pending migrations, oldest to newest.
  Run,
  /// Run down.sql for non-pending migrations, newest to oldest.
  Revert,
}

/// Placing the main function in lib.rs allows other crates to import it and embed chirp
pub async fn start_chirp_server(args: CmdArgs) -> ChirpResult<()> {
  if let Some(CmdSubcommand::Migration {
    subcommand,
    all,
    number,
  }) = args.subcommand
  {
    let mut options = match subcommand {
      MigrationSubcommand::Run => schema_setup::Options::default().run(),
      MigrationSubcommand::Revert => schema_setup::Options::default().revert(),
    }
    .print_output();

    if !all {
      options = options.limit(number);
    }

    schema_setup::run(options, &SETTINGS.get_database_url())?;

    return Ok(());
  }

  // Runs pending migrations before handing out connections
  let pool = build_db_pool()?;
  let pool = &mut (&pool).into();
  get_conn(pool).await?;

  info!(
    "Chirp database ready at {}, pool size {}",
    SETTINGS.get_database_url(),
    SETTINGS.database.pool_size
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_parse_migration_args() {
    let args = CmdArgs::parse_from(["chirp_server", "migration", "--all", "revert"]);
    let Some(CmdSubcommand::Migration {
      subcommand,
      all,
      number,
    }) = args.subcommand
    else {
      panic!("expected the migration subcommand");
    };
    assert_eq!(MigrationSubcommand::Revert, subcommand);
    assert!(all);
    assert_eq!(1, number);

    let args = CmdArgs::parse_from(["chirp_server"]);
    assert!(args.subcommand.is_none());
  }
}
