use crate::{
  newtypes::{LikeId, PostId, UserId},
  source::like::{Like, LikeForm, LikeSafe},
  traits::{Likeable, Serializable},
};
use async_trait::async_trait;
use chirp_db_schema_file::schema::{like, post};
use chirp_diesel_utils::connection::{get_conn, DbPool};
use chirp_utils::error::{ChirpErrorExt, ChirpErrorType, ChirpResult};
use diesel::{dsl::insert_into, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

#[async_trait]
impl Likeable for Like {
  type Form = LikeForm;

  /// Always inserts a new row, even if the user already likes the post.
  async fn like(pool: &mut DbPool<'_>, form: &LikeForm) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(like::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntLikePost)
  }

  /// Removes every like `user_id` left on `post_id`.
  async fn remove(pool: &mut DbPool<'_>, user_id: UserId, post_id: PostId) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    diesel::delete(
      like::table
        .filter(like::user_id.eq(user_id))
        .filter(like::post_id.eq(post_id)),
    )
    .execute(conn)
    .await
    .with_chirp_type(ChirpErrorType::CouldntRemoveLike)
  }
}

impl Like {
  pub async fn read(pool: &mut DbPool<'_>, like_id: LikeId) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(like::table.find(like_id).first(conn).await?)
  }

  pub async fn delete(pool: &mut DbPool<'_>, like_id: LikeId) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    diesel::delete(like::table.find(like_id))
      .execute(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntRemoveLike)
  }

  pub async fn list_for_post(pool: &mut DbPool<'_>, for_post_id: PostId) -> ChirpResult<Vec<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      like::table
        .filter(like::post_id.eq(for_post_id))
        .order_by(like::id)
        .load(conn)
        .await?,
    )
  }

  pub async fn list_for_user(pool: &mut DbPool<'_>, for_user_id: UserId) -> ChirpResult<Vec<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      like::table
        .filter(like::user_id.eq(for_user_id))
        .order_by(like::id)
        .load(conn)
        .await?,
    )
  }

  /// Counts rows, so repeated likes by one user all count.
  pub async fn count_for_post(pool: &mut DbPool<'_>, for_post_id: PostId) -> ChirpResult<i64> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      like::table
        .filter(like::post_id.eq(for_post_id))
        .count()
        .get_result(conn)
        .await?,
    )
  }

  pub(crate) async fn delete_for_post(
    pool: &mut DbPool<'_>,
    for_post_id: PostId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(like::table.filter(like::post_id.eq(for_post_id)))
        .execute(conn)
        .await?,
    )
  }

  pub(crate) async fn delete_for_user(
    pool: &mut DbPool<'_>,
    for_user_id: UserId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(like::table.filter(like::user_id.eq(for_user_id)))
        .execute(conn)
        .await?,
    )
  }

  /// Likes by anyone on posts written by `for_user_id`.
  pub(crate) async fn delete_on_posts_of_user(
    pool: &mut DbPool<'_>,
    for_user_id: UserId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    let user_posts = post::table
      .filter(post::user_id.eq(for_user_id))
      .select(post::id);
    Ok(
      diesel::delete(like::table.filter(like::post_id.eq_any(user_posts)))
        .execute(conn)
        .await?,
    )
  }
}

impl Serializable for Like {
  type Serialized = LikeSafe;

  fn serialize(&self) -> LikeSafe {
    LikeSafe {
      id: self.id,
      user_id: self.user_id,
      post_id: self.post_id,
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    newtypes::{LikeId, PostId, UserId},
    source::{
      like::{Like, LikeForm},
      post::{Post, PostInsertForm},
      user::{User, UserInsertForm},
    },
    traits::{Crud, Likeable, Serializable},
  };
  use chirp_diesel_utils::connection::build_db_pool_for_tests;
  use chirp_utils::error::{ChirpError, ChirpErrorType, ChirpResult};
  use diesel::result::DatabaseErrorKind;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[tokio::test]
  async fn test_like_and_remove() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let fan = User::create(pool, &UserInsertForm::new("fan@x.com".into(), "pw".into(), true)).await?;
    let author =
      User::create(pool, &UserInsertForm::new("star@x.com".into(), "pw".into(), true)).await?;
    let inserted_post = Post::create(pool, &PostInsertForm::new("liked".into(), author.id)).await?;

    let like_form = LikeForm::new(fan.id, inserted_post.id);
    let inserted_like = Like::like(pool, &like_form).await?;

    let expected_like = Like {
      id: inserted_like.id,
      user_id: fan.id,
      post_id: inserted_post.id,
    };
    assert_eq!(expected_like, inserted_like);
    assert_eq!(expected_like, Like::read(pool, inserted_like.id).await?);

    // Liking twice is allowed and counted twice
    let second_like = Like::like(pool, &like_form).await?;
    assert_ne!(inserted_like.id, second_like.id);
    assert_eq!(2, Like::count_for_post(pool, inserted_post.id).await?);
    assert_eq!(
      vec![expected_like.clone(), second_like.clone()],
      Like::list_for_post(pool, inserted_post.id).await?
    );
    assert_eq!(
      vec![expected_like, second_like.clone()],
      Like::list_for_user(pool, fan.id).await?
    );

    assert_eq!(1, Like::delete(pool, second_like.id).await?);
    assert_eq!(1, Like::count_for_post(pool, inserted_post.id).await?);

    Like::like(pool, &like_form).await?;
    let num_removed = Like::remove(pool, fan.id, inserted_post.id).await?;
    assert_eq!(2, num_removed);
    assert_eq!(0, Like::count_for_post(pool, inserted_post.id).await?);

    User::delete(pool, fan.id).await?;
    User::delete(pool, author.id).await?;

    Ok(())
  }

  #[tokio::test]
  async fn test_foreign_keys() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let inserted_user =
      User::create(pool, &UserInsertForm::new("fk-like@x.com".into(), "pw".into(), true)).await?;
    let inserted_post =
      Post::create(pool, &PostInsertForm::new("post".into(), inserted_user.id)).await?;

    for form in [
      LikeForm::new(inserted_user.id, PostId(9999)),
      LikeForm::new(UserId(9999), inserted_post.id),
    ] {
      let err = Like::like(pool, &form).await.err();
      assert_eq!(
        Some(ChirpErrorType::CouldntLikePost),
        err.as_ref().map(|e| e.error_type.clone())
      );
      assert!(matches!(
        err.as_ref().and_then(ChirpError::database_error_kind),
        Some(DatabaseErrorKind::ForeignKeyViolation)
      ));
    }
    assert_eq!(0, Like::count_for_post(pool, inserted_post.id).await?);

    User::delete(pool, inserted_user.id).await?;

    Ok(())
  }

  #[test]
  fn test_serialize() -> ChirpResult<()> {
    let like = Like {
      id: LikeId(4),
      user_id: UserId(1),
      post_id: PostId(2),
    };

    assert_eq!(
      json!({ "id": 4, "user_id": 1, "post_id": 2 }),
      serde_json::to_value(like.serialize())?
    );

    Ok(())
  }
}
