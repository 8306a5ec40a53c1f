use crate::{
  newtypes::UserId,
  source::follower::{Follower, FollowerForm},
  traits::Followable,
};
use async_trait::async_trait;
use chirp_db_schema_file::schema::followers;
use chirp_diesel_utils::connection::{get_conn, DbPool};
use chirp_utils::error::{ChirpErrorExt, ChirpErrorType, ChirpResult};
use diesel::{dsl::insert_into, BoolExpressionMethods, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

#[async_trait]
impl Followable for Follower {
  type Form = FollowerForm;

  async fn follow(pool: &mut DbPool<'_>, form: &FollowerForm) -> ChirpResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(followers::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .with_chirp_type(ChirpErrorType::CouldntFollowUser)
  }

  /// Drops every stored copy of the edge.
  async fn unfollow(pool: &mut DbPool<'_>, form: &FollowerForm) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    diesel::delete(
      followers::table
        .filter(followers::follower_id.eq(form.follower_id))
        .filter(followers::followed_id.eq(form.followed_id)),
    )
    .execute(conn)
    .await
    .with_chirp_type(ChirpErrorType::CouldntUnfollowUser)
  }
}

impl Follower {
  /// Every edge with `for_user_id` on either end.
  pub(crate) async fn delete_for_user(
    pool: &mut DbPool<'_>,
    for_user_id: UserId,
  ) -> ChirpResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(
        followers::table.filter(
          followers::follower_id
            .eq(for_user_id)
            .or(followers::followed_id.eq(for_user_id)),
        ),
      )
      .execute(conn)
      .await?,
    )
  }
}
