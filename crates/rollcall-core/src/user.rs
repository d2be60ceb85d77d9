//! User records as served by the backend's user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A user account. `prn` and `face_registered` are only populated for
/// students; the backend omits them for other roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:    i64,
  pub name:  String,
  pub email: String,
  pub role:  Role,
  /// Student roll number.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prn: Option<String>,
  pub is_active: bool,
  /// Whether a reference face has been enrolled for recognition.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub face_registered: Option<bool>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub role:     Role,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prn: Option<String>,
}

/// Partial update for `PUT /users/:id`. `None` fields are left untouched
/// server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role: Option<Role>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
}
