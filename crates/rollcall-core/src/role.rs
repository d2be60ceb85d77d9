//! The closed set of roles the backend recognises.
//!
//! Role is a tagged variant rather than a string so that every dispatch on
//! it — navigation sets, dashboard actions, route allow-lists — is an
//! exhaustive match checked at compile time.

use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

  /// The wire discriminant, matching the serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Teacher => "teacher",
      Role::Student => "student",
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Role::Admin),
      "teacher" => Ok(Role::Teacher),
      "student" => Ok(Role::Student),
      other => Err(format!("unknown role: {other}")),
    }
  }
}
