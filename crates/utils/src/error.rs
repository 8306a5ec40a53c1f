use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use std::{
  backtrace::Backtrace,
  fmt::{self, Debug},
};
use strum::{Display, EnumIter};

#[derive(Display, Debug, Serialize, Deserialize, Clone, PartialEq, Eq, EnumIter, Hash)]
#[serde(tag = "error", content = "message", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChirpErrorType {
  NotFound,
  EmailAlreadyExists,
  CouldntCreateUser,
  CouldntUpdateUser,
  CouldntDeleteUser,
  CouldntCreatePost,
  CouldntUpdatePost,
  CouldntDeletePost,
  CouldntCreateComment,
  CouldntUpdateComment,
  CouldntDeleteComment,
  CouldntLikePost,
  CouldntRemoveLike,
  CouldntFollowUser,
  CouldntUnfollowUser,
  CouldntRunMigrations,
  Unknown(String),
}

pub type ChirpResult<T> = Result<T, ChirpError>;

pub struct ChirpError {
  pub error_type: ChirpErrorType,
  pub inner: anyhow::Error,
  pub context: Backtrace,
}

impl ChirpError {
  /// The constraint kind reported by the database, if the cause is a database error.
  pub fn database_error_kind(&self) -> Option<&DatabaseErrorKind> {
    match self.inner.downcast_ref::<DieselError>() {
      Some(DieselError::DatabaseError(kind, _)) => Some(kind),
      _ => None,
    }
  }
}

impl<T> From<T> for ChirpError
where
  T: Into<anyhow::Error>,
{
  fn from(t: T) -> Self {
    let cause = t.into();
    let error_type = match cause.downcast_ref::<DieselError>() {
      Some(&DieselError::NotFound) => ChirpErrorType::NotFound,
      _ => ChirpErrorType::Unknown(format!("{}", &cause)),
    };
    ChirpError {
      error_type,
      inner: cause,
      context: Backtrace::capture(),
    }
  }
}

impl Debug for ChirpError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChirpError")
      .field("message", &self.error_type)
      .field("inner", &self.inner)
      .field("context", &self.context)
      .finish()
  }
}

impl fmt::Display for ChirpError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}: ", &self.error_type)?;
    writeln!(f, "{}", self.inner)?;
    fmt::Display::fmt(&self.context, f)
  }
}

impl From<ChirpErrorType> for ChirpError {
  fn from(error_type: ChirpErrorType) -> Self {
    let inner = anyhow::anyhow!("{}", error_type);
    ChirpError {
      error_type,
      inner,
      context: Backtrace::capture(),
    }
  }
}

pub trait ChirpErrorExt<T, E: Into<anyhow::Error>> {
  fn with_chirp_type(self, error_type: ChirpErrorType) -> ChirpResult<T>;
}

impl<T, E: Into<anyhow::Error>> ChirpErrorExt<T, E> for Result<T, E> {
  fn with_chirp_type(self, error_type: ChirpErrorType) -> ChirpResult<T> {
    self.map_err(|error| ChirpError {
      error_type,
      inner: error.into(),
      context: Backtrace::capture(),
    })
  }
}

pub trait ChirpErrorExt2<T> {
  fn with_chirp_type(self, error_type: ChirpErrorType) -> ChirpResult<T>;
}

impl<T> ChirpErrorExt2<T> for ChirpResult<T> {
  fn with_chirp_type(self, error_type: ChirpErrorType) -> ChirpResult<T> {
    self.map_err(|mut e| {
      e.error_type = error_type;
      e
    })
  }
}
