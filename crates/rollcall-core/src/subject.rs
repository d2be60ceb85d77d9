//! Subjects and enrollment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// A taught subject. Many subjects may reference the same teacher; a
/// subject with no teacher renders as "Unassigned".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub id:   i64,
  pub name: String,
  pub code: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub teacher_id: Option<i64>,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Embedded teacher, when the backend expands the reference.
  #[serde(default)]
  pub teacher: Option<User>,
}

impl Subject {
  /// The assigned teacher's display name, if one is embedded.
  pub fn teacher_name(&self) -> Option<&str> {
    self.teacher.as_ref().map(|t| t.name.as_str())
  }
}

/// Payload for `POST /subjects`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubject {
  pub name: String,
  pub code: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub teacher_id: Option<i64>,
}

/// Partial update for `PUT /subjects/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub teacher_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
}

/// A confirmed enrollment, as returned by `POST /subjects/:id/enroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub id:         i64,
  pub student_id: i64,
  pub subject_id: i64,
  pub enrollment_date: DateTime<Utc>,
  pub is_active:  bool,
}

/// One roster row from `GET /subjects/:id/students`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledStudent {
  pub id:    i64,
  pub name:  String,
  pub email: String,
  pub enrollment_date: DateTime<Utc>,
}
