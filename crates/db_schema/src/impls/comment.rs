use crate::{
  newtypes::{CommentId, PostId, UserId},
  source::comment::{Comment, CommentInsertForm, CommentSafe, CommentUpdateForm},
  traits::{Crud, Serializable},
};
use async_trait::async_trait;
use chirp_db_schema_file::schema::{comment, post};
use chirp_diesel_utils::connection::{get_conn, DbPool};
use chirp_utils::error::{ChirpErrorExt, ChirpErrorType, ChirpResult};
use diesel::{dsl::insert_into, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

#[async_trait]
impl Crud for Comment {
  type InsertForm = CommentInsertForm;
  type UpdateForm = CommentUpdateForm;
  type IdType = CommentId;

  async fn create(pool: &mut DbPool<'_>, form: &Self::InsertForm) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(comment::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntCreateComment)
  }

  async fn read(pool: &mut DbPool<'_>, comment_id: CommentId) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(comment::table.find(comment_id).first(conn).await?)
  }

  async fn update(
    pool: &mut DbPool<'_>,
    comment_id: CommentId,
    form: &Self::UpdateForm,
  ) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    diesel::update(comment::table.find(comment_id))
      .set(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntUpdateComment)
  }

  async fn delete(pool: &mut DbPool<'_>, comment_id: CommentId) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    diesel::delete(comment::table.find(comment_id))
      .execute(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntDeleteComment)
  }
}

impl Comment {
  pub async fn list_for_post(pool: &mut DbPool<'_>, for_post_id: PostId) -> ChirpResult<Vec<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      comment::table
        .filter(comment::post_id.eq(for_post_id))
        .order_by(comment::id)
        .load(conn)
        .await?,
    )
  }

  pub async fn list_for_user(pool: &mut DbPool<'_>, for_user_id: UserId) -> ChirpResult<Vec<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      comment::table
        .filter(comment::user_id.eq(for_user_id))
        .order_by(comment::id)
        .load(conn)
        .await?,
    )
  }

  pub(crate) async fn delete_for_post(
    pool: &mut DbPool<'_>,
    for_post_id: PostId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(comment::table.filter(comment::post_id.eq(for_post_id)))
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
      diesel::delete(comment::table.filter(comment::user_id.eq(for_user_id)))
        .execute(conn)
        .await?,
    )
  }

  /// Comments by anyone on posts written by `for_user_id`.
  pub(crate) async fn delete_on_posts_of_user(
    pool: &mut DbPool<'_>,
    for_user_id: UserId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    let user_posts = post::table
      .filter(post::user_id.eq(for_user_id))
      .select(post::id);
    Ok(
      diesel::delete(comment::table.filter(comment::post_id.eq_any(user_posts)))
        .execute(conn)
        .await?,
    )
  }
}

impl Serializable for Comment {
  type Serialized = CommentSafe;

  fn serialize(&self) -> CommentSafe {
    CommentSafe {
      id: self.id,
      content: self.content.clone(),
      user_id: self.user_id,
      post_id: self.post_id,
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    newtypes::{CommentId, PostId, UserId},
    source::{
      comment::{Comment, CommentInsertForm, CommentUpdateForm},
      post::{Post, PostInsertForm},
      user::{User, UserInsertForm},
    },
    traits::{Crud, Serializable},
  };
  use chirp_diesel_utils::connection::build_db_pool_for_tests;
  use chirp_utils::error::{ChirpError, ChirpErrorType, ChirpResult};
  use diesel::result::DatabaseErrorKind;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[tokio::test]
  async fn test_crud() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let user_form = UserInsertForm::new("commenter@x.com".into(), "pw".into(), true);
    let inserted_user = User::create(pool, &user_form).await?;
    let post_form = PostInsertForm::new("a post".into(), inserted_user.id);
    let inserted_post = Post::create(pool, &post_form).await?;

    let comment_form =
      CommentInsertForm::new("a comment".into(), inserted_user.id, inserted_post.id);
    let inserted_comment = Comment::create(pool, &comment_form).await?;

    let expected_comment = Comment {
      id: inserted_comment.id,
      content: "a comment".into(),
      user_id: inserted_user.id,
      post_id: inserted_post.id,
    };

    let second_form =
      CommentInsertForm::new("another one".into(), inserted_user.id, inserted_post.id);
    let second_comment = Comment::create(pool, &second_form).await?;

    let read_comment = Comment::read(pool, inserted_comment.id).await?;
    let for_post = Comment::list_for_post(pool, inserted_post.id).await?;
    let for_user = Comment::list_for_user(pool, inserted_user.id).await?;

    let update_form = CommentUpdateForm {
      content: Some("an edited comment".into()),
    };
    let updated_comment = Comment::update(pool, inserted_comment.id, &update_form).await?;

    let empty_update =
      Comment::update(pool, inserted_comment.id, &CommentUpdateForm::default()).await;
    assert_eq!(
      Some(ChirpErrorType::CouldntUpdateComment),
      empty_update.err().map(|e| e.error_type)
    );

    let num_deleted = Comment::delete(pool, inserted_comment.id).await?;
    let remaining = Comment::list_for_post(pool, inserted_post.id).await?;

    User::delete(pool, inserted_user.id).await?;

    assert_eq!(expected_comment, read_comment);
    assert_eq!(expected_comment, inserted_comment);
    assert_eq!(
      vec![expected_comment.clone(), second_comment.clone()],
      for_post
    );
    assert_eq!(for_post, for_user);
    assert_eq!("an edited comment", updated_comment.content);
    assert_eq!(1, num_deleted);
    assert_eq!(vec![second_comment], remaining);

    Ok(())
  }

  #[tokio::test]
  async fn test_foreign_keys() -> ChirpResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let user_form = UserInsertForm::new("fk@x.com".into(), "pw".into(), true);
    let inserted_user = User::create(pool, &user_form).await?;
    let post_form = PostInsertForm::new("a post".into(), inserted_user.id);
    let inserted_post = Post::create(pool, &post_form).await?;

    let bad_post = CommentInsertForm::new("lost".into(), inserted_user.id, PostId(9999));
    let bad_user = CommentInsertForm::new("lost".into(), UserId(9999), inserted_post.id);

    for form in [bad_post, bad_user] {
      let err = Comment::create(pool, &form).await.err();
      assert_eq!(
        Some(ChirpErrorType::CouldntCreateComment),
        err.as_ref().map(|e| e.error_type.clone())
      );
      assert!(matches!(
        err.as_ref().and_then(ChirpError::database_error_kind),
        Some(DatabaseErrorKind::ForeignKeyViolation)
      ));
    }
    assert!(Comment::list_for_post(pool, inserted_post.id).await?.is_empty());

    User::delete(pool, inserted_user.id).await?;

    Ok(())
  }

  #[test]
  fn test_serialize() -> ChirpResult<()> {
    let comment = Comment {
      id: CommentId(5),
      content: "first".into(),
      user_id: UserId(1),
      post_id: PostId(2),
    };

    assert_eq!(
      json!({ "id": 5, "content": "first", "user_id": 1, "post_id": 2 }),
      serde_json::to_value(comment.serialize())?
    );

    Ok(())
  }
}
