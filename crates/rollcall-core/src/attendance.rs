//! Attendance sessions, per-student records, and derived statistics.
//!
//! A session is one class meeting; records are one-per-(session, student),
//! with uniqueness on that pair owned by the backend. The client only holds
//! transient copies for rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// The kind of class meeting a session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
  Lecture,
  Lab,
  Tutorial,
}

impl ClassType {
  pub const ALL: [ClassType; 3] =
    [ClassType::Lecture, ClassType::Lab, ClassType::Tutorial];

  pub fn as_str(self) -> &'static str {
    match self {
      ClassType::Lecture => "lecture",
      ClassType::Lab => "lab",
      ClassType::Tutorial => "tutorial",
    }
  }
}

/// A student's presence outcome for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
  Late,
}

impl AttendanceStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      AttendanceStatus::Present => "present",
      AttendanceStatus::Absent => "absent",
      AttendanceStatus::Late => "late",
    }
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// One class-meeting instance for which presence is recorded. Immutable
/// once created except for status and counts, which the detection step
/// updates server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
  pub id:         i64,
  pub subject_id: i64,
  pub teacher_id: i64,
  pub session_date: DateTime<Utc>,
  pub class_type: ClassType,
  #[serde(default)]
  pub image_path: Option<String>,
  pub total_students:   i64,
  pub present_students: i64,
  pub status: String,
  #[serde(default)]
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /attendance/sessions`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAttendanceSession {
  pub subject_id: i64,
  pub session_date: DateTime<Utc>,
  pub class_type: ClassType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One student's presence outcome for a given session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub id:         i64,
  pub session_id: i64,
  pub student_id: i64,
  pub status:     AttendanceStatus,
  /// Recognition confidence as reported by the detection pipeline.
  #[serde(default)]
  pub confidence_score: Option<String>,
  pub manual_override: bool,
  #[serde(default)]
  pub notes: Option<String>,
  pub marked_at: DateTime<Utc>,
  /// Embedded student, when the backend expands the reference.
  #[serde(default)]
  pub student: Option<User>,
}

/// Payload for `POST /attendance/sessions/:id/records`. Re-marking a
/// (session, student) pair replaces the existing record.
#[derive(Debug, Clone, Serialize)]
pub struct NewAttendanceRecord {
  pub student_id: i64,
  pub status:     AttendanceStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

// ─── Detection results ───────────────────────────────────────────────────────

/// Per-student outcome of processing an uploaded class photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedStudent {
  pub student_id: i64,
  pub name:       String,
  pub email:      String,
  #[serde(default)]
  pub prn: Option<String>,
  pub detected: bool,
  /// Match confidence in [0, 1]; absent when not detected.
  #[serde(default)]
  pub confidence: Option<f64>,
  /// Index of the matched face within the uploaded image.
  #[serde(default)]
  pub face_index: Option<i64>,
}

/// Response of `POST /attendance/sessions/:id/upload-image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProcessingOutcome {
  pub session_id: i64,
  pub detected_students: Vec<DetectedStudent>,
  pub total_detected: i64,
  pub processing_status: String,
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Per-subject attendance totals for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStats {
  pub total_classes:    i64,
  pub attended_classes: i64,
  pub attendance_percentage: f64,
  pub subject_name: String,
  pub subject_id:   i64,
}

/// Response of `GET /attendance/student/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAttendanceSummary {
  pub student:  User,
  pub subjects: Vec<AttendanceStats>,
  pub overall_percentage: f64,
}
