use chirp_db_schema_file::schema_setup;
use chirp_utils::{
  error::{ChirpError, ChirpResult},
  settings::SETTINGS,
};
use deadpool::Runtime;
use diesel::{
  result::{
    ConnectionError,
    ConnectionResult,
    Error::{self as DieselError, QueryBuilderError},
  },
  SqliteConnection,
};
use diesel_async::{
  pooled_connection::{
    deadpool::{Object as PooledConnection, Pool},
    AsyncDieselConnectionManager,
    ManagerConfig,
  },
  scoped_futures::ScopedBoxFuture,
  sync_connection_wrapper::SyncConnectionWrapper,
  AsyncConnection,
  SimpleAsyncConnection,
};
use futures_util::{future::BoxFuture, FutureExt};
use std::{
  fs,
  io::{self, ErrorKind},
  ops::{Deref, DerefMut},
  path::Path,
  sync::atomic::{AtomicUsize, Ordering},
};
use tracing::info;

/// SQLite runs on a blocking thread behind this wrapper, so it can be driven from async code.
pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;

pub type ActualDbPool = Pool<DbConnection>;

/// Applied to every new connection. SQLite leaves foreign keys unchecked unless asked.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

/// References a pool or connection. Functions must take `&mut DbPool<'_>` to allow implicit
/// reborrowing.
///
/// https://github.com/rust-lang/rfcs/issues/1403
pub enum DbPool<'a> {
  Pool(&'a ActualDbPool),
  Conn(&'a mut DbConnection),
}

pub enum DbConn<'a> {
  Pool(PooledConnection<DbConnection>),
  Conn(&'a mut DbConnection),
}

pub async fn get_conn<'a, 'b: 'a>(pool: &'a mut DbPool<'b>) -> Result<DbConn<'a>, DieselError> {
  Ok(match pool {
    DbPool::Pool(pool) => DbConn::Pool(pool.get().await.map_err(|e| QueryBuilderError(e.into()))?),
    DbPool::Conn(conn) => DbConn::Conn(conn),
  })
}

impl DbConn<'_> {
  pub async fn run_transaction<'a, R, F>(&mut self, callback: F) -> ChirpResult<R>
  where
    F: for<'r> FnOnce(&'r mut DbConnection) -> ScopedBoxFuture<'a, 'r, ChirpResult<R>>
      + Send
      + 'a,
    R: Send + 'a,
  {
    self
      .deref_mut()
      .transaction::<_, ChirpError, _>(callback)
      .await
  }
}

impl Deref for DbConn<'_> {
  type Target = DbConnection;

  fn deref(&self) -> &Self::Target {
    match self {
      DbConn::Pool(conn) => conn.deref(),
      DbConn::Conn(conn) => conn.deref(),
    }
  }
}

impl DerefMut for DbConn<'_> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    match self {
      DbConn::Pool(conn) => conn.deref_mut(),
      DbConn::Conn(conn) => conn.deref_mut(),
    }
  }
}

// Allows functions that take `DbPool<'_>` to be called in a transaction by passing `&mut
// conn.into()`
impl<'a> From<&'a mut DbConnection> for DbPool<'a> {
  fn from(value: &'a mut DbConnection) -> Self {
    DbPool::Conn(value)
  }
}

impl<'a, 'b: 'a> From<&'a mut DbConn<'b>> for DbPool<'a> {
  fn from(value: &'a mut DbConn<'b>) -> Self {
    DbPool::Conn(value.deref_mut())
  }
}

impl<'a> From<&'a ActualDbPool> for DbPool<'a> {
  fn from(value: &'a ActualDbPool) -> Self {
    DbPool::Pool(value)
  }
}

/// Builds the pool from the global settings, running pending migrations first.
pub fn build_db_pool() -> ChirpResult<ActualDbPool> {
  let db_url = SETTINGS.get_database_url();
  build_db_pool_with_url(&db_url, SETTINGS.database.pool_size)
}

pub fn build_db_pool_with_url(db_url: &str, pool_size: usize) -> ChirpResult<ActualDbPool> {
  schema_setup::run(schema_setup::Options::default().run(), db_url)?;

  // Pragmas are per connection, so they go into the setup function instead of a migration
  let mut config = ManagerConfig::default();
  config.custom_setup = Box::new(establish_connection);
  let manager = AsyncDieselConnectionManager::<DbConnection>::new_with_config(db_url, config);
  let pool = Pool::builder(manager)
    .max_size(pool_size)
    .runtime(Runtime::Tokio1)
    .build()?;

  info!("Database pool ready for {db_url}");
  Ok(pool)
}

static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Every call gets its own freshly migrated database file, so tests can run in parallel.
#[allow(clippy::expect_used)]
pub fn build_db_pool_for_tests() -> ActualDbPool {
  let path = std::env::temp_dir().join(format!(
    "chirp_test_{}_{}.sqlite3",
    std::process::id(),
    TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst)
  ));
  // Left over from an earlier run with the same pid
  remove_stale_db(&path).expect("couldn't remove stale test database");
  build_db_pool_with_url(&path.to_string_lossy(), 2).expect("db pool missing")
}

/// Deletes the database file at `path`. A file that doesn't exist counts as removed.
fn remove_stale_db(path: &Path) -> io::Result<()> {
  match fs::remove_file(path) {
    Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
    _ => Ok(()),
  }
}

fn establish_connection(config: &str) -> BoxFuture<'_, ConnectionResult<DbConnection>> {
  let fut = async {
    let mut conn = DbConnection::establish(config).await?;
    conn
      .batch_execute(CONNECTION_PRAGMAS)
      .await
      .map_err(ConnectionError::CouldntSetupConfiguration)?;

    Ok(conn)
  };
  fut.boxed()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chirp_db_schema_file::schema::{post, user};
  use diesel::{
    result::DatabaseErrorKind,
    ExpressionMethods,
    QueryDsl,
  };
  use diesel_async::{scoped_futures::ScopedFutureExt, RunQueryDsl};
  use pretty_assertions::assert_eq;

  #[tokio::test]
  async fn test_foreign_keys_enforced() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();
    let conn = &mut get_conn(pool).await?;

    let res = diesel::insert_into(post::table)
      .values((post::content.eq("orphan"), post::user_id.eq(999)))
      .execute(conn)
      .await;

    assert!(matches!(
      res,
      Err(DieselError::DatabaseError(
        DatabaseErrorKind::ForeignKeyViolation,
        _
      ))
    ));

    Ok(())
  }

  #[tokio::test]
  async fn test_transaction_rolls_back() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();
    let conn = &mut get_conn(pool).await?;

    let res = conn
      .run_transaction(|conn| {
        async move {
          diesel::insert_into(user::table)
            .values((
              user::email.eq("rollback@x.com"),
              user::password.eq("secret"),
              user::is_active.eq(true),
            ))
            .execute(conn)
            .await?;
          // Same email again, violates the unique constraint
          diesel::insert_into(user::table)
            .values((
              user::email.eq("rollback@x.com"),
              user::password.eq("secret"),
              user::is_active.eq(true),
            ))
            .execute(conn)
            .await?;
          Ok(())
        }
        .scope_boxed()
      })
      .await;
    assert!(matches!(
      res.err().as_ref().and_then(ChirpError::database_error_kind),
      Some(DatabaseErrorKind::UniqueViolation)
    ));

    let users: i64 = user::table.count().get_result(conn).await?;
    assert_eq!(0, users);

    Ok(())
  }

  #[test]
  fn test_remove_stale_db() -> ChirpResult<()> {
    let path = std::env::temp_dir().join(format!("chirp_stale_{}.sqlite3", std::process::id()));
    fs::write(&path, "not a database")?;

    remove_stale_db(&path)?;
    assert!(!path.exists());
    // Already gone
    remove_stale_db(&path)?;

    // A directory can't be removed as a file, that error must come through
    let dir = std::env::temp_dir().join(format!("chirp_stale_dir_{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    assert!(remove_stale_db(&dir).is_err());
    fs::remove_dir(&dir)?;

    Ok(())
  }
}
