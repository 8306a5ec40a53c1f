use crate::{newtypes::UserId, sensitive::SensitiveString};
use chirp_db_schema_file::schema::user;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// An account. Owns posts, comments and likes, and takes part in the follower graph.
pub struct User {
  pub id: UserId,
  /// Unique across all users, at most 120 characters.
  pub email: String,
  /// Stored as given, hashing happens before it reaches this layer.
  pub password: SensitiveString,
  pub is_active: bool,
}

/// A safe representation of user, without the sensitive info
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSafe {
  pub id: UserId,
  pub email: String,
}

#[derive(Debug, Clone, derive_new::new, Insertable)]
#[diesel(table_name = user)]
pub struct UserInsertForm {
  pub email: String,
  pub password: SensitiveString,
  pub is_active: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = user)]
pub struct UserUpdateForm {
  pub email: Option<String>,
  pub password: Option<SensitiveString>,
  pub is_active: Option<bool>,
}
