use crate::newtypes::{PostId, UserId};
use async_trait::async_trait;
use chirp_diesel_utils::connection::DbPool;
use chirp_utils::error::ChirpResult;
use serde::Serialize;

#[async_trait]
pub trait Crud {
  type InsertForm;
  type UpdateForm;
  type IdType;
  async fn create(pool: &mut DbPool<'_>, form: &Self::InsertForm) -> ChirpResult<Self>
  where
    Self: Sized;
  async fn read(pool: &mut DbPool<'_>, id: Self::IdType) -> ChirpResult<Self>
  where
    Self: Sized;
  /// Fields left as `None` in the form keep their current value.
  async fn update(
    pool: &mut DbPool<'_>,
    id: Self::IdType,
    form: &Self::UpdateForm,
  ) -> ChirpResult<Self>
  where
    Self: Sized;
  /// Removes the row together with everything it owns. Returns the number of rows of this type
  /// that were deleted.
  async fn delete(pool: &mut DbPool<'_>, id: Self::IdType) -> ChirpResult<usize>
  where
    Self: Sized;
}

#[async_trait]
pub trait Followable {
  type Form;
  async fn follow(pool: &mut DbPool<'_>, form: &Self::Form) -> ChirpResult<Self>
  where
    Self: Sized;
  async fn unfollow(pool: &mut DbPool<'_>, form: &Self::Form) -> ChirpResult<usize>
  where
    Self: Sized;
}

#[async_trait]
pub trait Likeable {
  type Form;
  async fn like(pool: &mut DbPool<'_>, form: &Self::Form) -> ChirpResult<Self>
  where
    Self: Sized;
  async fn remove(pool: &mut DbPool<'_>, user_id: UserId, post_id: PostId) -> ChirpResult<usize>
  where
    Self: Sized;
}

/// A plain field/value view of a row, ready to be sent over the wire. Relationships and
/// credentials are never part of it.
pub trait Serializable {
  type Serialized: Serialize;
  fn serialize(&self) -> Self::Serialized;
}
