use crate::{
  newtypes::{PostId, UserId},
  source::{
    comment::Comment,
    like::Like,
    post::{Post, PostInsertForm, PostSafe, PostUpdateForm},
    user::UserSafe,
  },
  traits::{Crud, Serializable},
};
use async_trait::async_trait;
use chirp_db_schema_file::schema::{post, user};
use chirp_diesel_utils::connection::{get_conn, DbPool};
use chirp_utils::error::{ChirpErrorExt, ChirpErrorExt2, ChirpErrorType, ChirpResult};
use diesel::{dsl::insert_into, ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{scoped_futures::ScopedFutureExt, RunQueryDsl};
use tracing::debug;

#[async_trait]
impl Crud for Post {
  type InsertForm = PostInsertForm;
  type UpdateForm = PostUpdateForm;
  type IdType = PostId;

  async fn create(pool: &mut DbPool<'_>, form: &Self::InsertForm) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(post::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntCreatePost)
  }

  async fn read(pool: &mut DbPool<'_>, post_id: PostId) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(post::table.find(post_id).first(conn).await?)
  }

  async fn update(
    pool: &mut DbPool<'_>,
    post_id: PostId,
    form: &Self::UpdateForm,
  ) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    diesel::update(post::table.find(post_id))
      .set(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntUpdatePost)
  }

  async fn delete(pool: &mut DbPool<'_>, post_id: PostId) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    conn
      .run_transaction(|conn| {
        async move {
          let comments = Comment::delete_for_post(&mut conn.into(), post_id).await?;
          let likes = Like::delete_for_post(&mut conn.into(), post_id).await?;
          let deleted = diesel::delete(post::table.find(post_id))
            .execute(conn)
            .await?;
          debug!("Deleted post {post_id} with {comments} comments and {likes} likes");
          Ok(deleted)
        }
        .scope_boxed()
      })
      .await
      .with_chirp_type(ChirpErrorType::CouldntDeletePost)
  }
}

impl Post {
  pub async fn list_for_user(pool: &mut DbPool<'_>, for_user_id: UserId) -> ChirpResult<Vec<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      post::table
        .filter(post::user_id.eq(for_user_id))
        .order_by(post::id)
        .load(conn)
        .await?,
    )
  }

  /// The user who wrote `post_id`.
  pub async fn read_creator(pool: &mut DbPool<'_>, post_id: PostId) -> ChirpResult<UserSafe> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      post::table
        .inner_join(user::table)
        .filter(post::id.eq(post_id))
        .select(UserSafe::as_select())
        .first(conn)
        .await?,
    )
  }

  /// Only removes the posts themselves. Anything still pointing at them makes this fail, so
  /// callers clear comments and likes first.
  pub(crate) async fn delete_for_user(
    pool: &mut DbPool<'_>,
    for_user_id: UserId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(post::table.filter(post::user_id.eq(for_user_id)))
        .execute(conn)
        .await?,
    )
  }
}

impl Serializable for Post {
  type Serialized = PostSafe;

  fn serialize(&self) -> PostSafe {
    PostSafe {
      id: self.id,
      content: self.content.clone(),
      user_id: self.user_id,
    }
  }
}
