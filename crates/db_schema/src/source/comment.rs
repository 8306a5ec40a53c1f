use crate::newtypes::{CommentId, PostId, UserId};
use chirp_db_schema_file::schema::comment;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// A comment, written by a user on a post.
pub struct Comment {
  pub id: CommentId,
  pub content: String,
  pub user_id: UserId,
  pub post_id: PostId,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CommentSafe {
  pub id: CommentId,
  pub content: String,
  pub user_id: UserId,
  pub post_id: PostId,
}

#[derive(Debug, Clone, derive_new::new, Insertable)]
#[diesel(table_name = comment)]
pub struct CommentInsertForm {
  pub content: String,
  pub user_id: UserId,
  pub post_id: PostId,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = comment)]
pub struct CommentUpdateForm {
  pub content: Option<String>,
}
