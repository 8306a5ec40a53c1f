use crate::newtypes::{LikeId, PostId, UserId};
use chirp_db_schema_file::schema::like;
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = like)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// A user liking a post. The same user may like the same post more than once.
pub struct Like {
  pub id: LikeId,
  pub user_id: UserId,
  pub post_id: PostId,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LikeSafe {
  pub id: LikeId,
  pub user_id: UserId,
  pub post_id: PostId,
}

#[derive(Debug, Clone, derive_new::new, Insertable)]
#[diesel(table_name = like)]
pub struct LikeForm {
  pub user_id: UserId,
  pub post_id: PostId,
}
