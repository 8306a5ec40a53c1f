use crate::newtypes::UserId;
use chirp_db_schema_file::schema::followers;

/// A directed follow edge: `follower_id` follows `followed_id`.
///
/// The table has no key, so the same edge can be stored more than once.
#[derive(Clone, PartialEq, Eq, Debug, Queryable, Selectable)]
#[diesel(table_name = followers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Follower {
  pub follower_id: UserId,
  pub followed_id: UserId,
}

#[derive(Debug, Clone, derive_new::new, Insertable)]
#[diesel(table_name = followers)]
pub struct FollowerForm {
  pub follower_id: UserId,
  pub followed_id: UserId,
}
