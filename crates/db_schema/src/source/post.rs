use crate::newtypes::{PostId, UserId};
use chirp_db_schema_file::schema::post;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// A post. Owns its comments and likes.
pub struct Post {
  pub id: PostId,
  pub content: String,
  pub user_id: UserId,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PostSafe {
  pub id: PostId,
  pub content: String,
  pub user_id: UserId,
}

#[derive(Debug, Clone, derive_new::new, Insertable)]
#[diesel(table_name = post)]
pub struct PostInsertForm {
  pub content: String,
  pub user_id: UserId,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = post)]
pub struct PostUpdateForm {
  pub content: Option<String>,
}
