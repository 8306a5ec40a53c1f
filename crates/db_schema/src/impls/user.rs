use crate::{
  newtypes::UserId,
  source::{
    comment::Comment,
    follower::Follower,
    like::Like,
    post::Post,
    user::{User, UserInsertForm, UserSafe, UserUpdateForm},
  },
  traits::{Crud, Serializable},
};
use async_trait::async_trait;
use chirp_db_schema_file::schema::{followers, user};
use chirp_diesel_utils::connection::{get_conn, DbPool};
use chirp_utils::error::{ChirpError, ChirpErrorExt2, ChirpErrorType, ChirpResult};
use diesel::{
  dsl::insert_into,
  result::{DatabaseErrorKind, Error},
  ExpressionMethods,
  JoinOnDsl,
  QueryDsl,
  SelectableHelper,
};
use diesel_async::{scoped_futures::ScopedFutureExt, RunQueryDsl};
use tracing::debug;

/// A taken email is reported as such, every other failure gets `fallback`.
fn email_error(err: Error, fallback: ChirpErrorType) -> ChirpError {
  let error_type = match err {
    Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
      ChirpErrorType::EmailAlreadyExists
    }
    _ => fallback,
  };
  let mut err = ChirpError::from(err);
  err.error_type = error_type;
  err
}

#[async_trait]
impl Crud for User {
  type InsertForm = UserInsertForm;
  type UpdateForm = UserUpdateForm;
  type IdType = UserId;

  async fn create(pool: &mut DbPool<'_>, form: &Self::InsertForm) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(user::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .map_err(|e| email_error(e, ChirpErrorType::CouldntCreateUser))
  }

  async fn read(pool: &mut DbPool<'_>, user_id: UserId) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(user::table.find(user_id).first(conn).await?)
  }

  async fn update(
    pool: &mut DbPool<'_>,
    user_id: UserId,
    form: &Self::UpdateForm,
  ) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    diesel::update(user::table.find(user_id))
      .set(form)
      .get_result::<Self>(conn)
      .await
      .map_err(|e| email_error(e, ChirpErrorType::CouldntUpdateUser))
  }

  /// Deletes the user along with their posts, comments, likes and follow edges. Comments and
  /// likes that other users left on those posts go too.
  async fn delete(pool: &mut DbPool<'_>, user_id: UserId) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    conn
      .run_transaction(|conn| {
        async move {
          let likes = Like::delete_on_posts_of_user(&mut conn.into(), user_id).await?
            + Like::delete_for_user(&mut conn.into(), user_id).await?;
          let comments = Comment::delete_on_posts_of_user(&mut conn.into(), user_id).await?
            + Comment::delete_for_user(&mut conn.into(), user_id).await?;
          let posts = Post::delete_for_user(&mut conn.into(), user_id).await?;
          let follows = Follower::delete_for_user(&mut conn.into(), user_id).await?;

          let deleted = diesel::delete(user::table.find(user_id))
            .execute(conn)
            .await?;
          debug!(
            "Deleted user {user_id} with {posts} posts, {comments} comments, {likes} likes and {follows} follow edges"
          );
          Ok(deleted)
        }
        .scope_boxed()
      })
      .await
      .with_chirp_type(ChirpErrorType::CouldntDeleteUser)
  }
}

impl User {
  pub async fn read_from_email(pool: &mut DbPool<'_>, email: &str) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      user::table
        .filter(user::email.eq(email))
        .first(conn)
        .await?,
    )
  }

  /// Users following `user_id`. A duplicated follow edge shows up once per edge.
  pub async fn followers(pool: &mut DbPool<'_>, user_id: UserId) -> ChirpResult<Vec<UserSafe>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      followers::table
        .inner_join(user::table.on(user::id.eq(followers::follower_id)))
        .filter(followers::followed_id.eq(user_id))
        .select(UserSafe::as_select())
        .order_by(user::id)
        .load(conn)
        .await?,
    )
  }

  /// Users that `user_id` follows.
  pub async fn following(pool: &mut DbPool<'_>, user_id: UserId) -> ChirpResult<Vec<UserSafe>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      followers::table
        .inner_join(user::table.on(user::id.eq(followers::followed_id)))
        .filter(followers::follower_id.eq(user_id))
        .select(UserSafe::as_select())
        .order_by(user::id)
        .load(conn)
        .await?,
    )
  }
}

impl Serializable for User {
  type Serialized = UserSafe;

  fn serialize(&self) -> UserSafe {
    UserSafe {
      id: self.id,
      email: self.email.clone(),
    }
  }
}
