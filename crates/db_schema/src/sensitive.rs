use serde::{Deserialize, Serialize};
use std::{fmt::Debug, ops::Deref};

/// Stored credential. Never printed by `Debug`, and kept out of every serialized view.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, Default)]
#[derive(DieselNewType)]
#[serde(transparent)]
pub struct SensitiveString(String);

impl Debug for SensitiveString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Sensitive").finish()
  }
}

impl Deref for SensitiveString {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl From<String> for SensitiveString {
  fn from(t: String) -> Self {
    SensitiveString(t)
  }
}

impl From<&str> for SensitiveString {
  fn from(t: &str) -> Self {
    SensitiveString(t.to_owned())
  }
}
