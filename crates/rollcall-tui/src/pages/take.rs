//! Teacher attendance capture: pick a subject, upload a class photo, then
//! review and save the detection results.

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_client::SubjectQuery;
use rollcall_core::{
  attendance::{
    AttendanceStatus, ClassType, DetectedStudent, NewAttendanceRecord,
    NewAttendanceSession,
  },
  subject::Subject,
};

use crate::{app::App, pages::edit_text};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TakeStep {
  #[default]
  Setup,
  Results,
}

/// One detection row, with the teacher's manual presence override.
pub struct DetectedRow {
  pub student: DetectedStudent,
  pub present: bool,
}

#[derive(Default)]
pub struct TakePage {
  /// The signed-in teacher's subjects.
  pub subjects: Vec<Subject>,
  pub subject_cursor: usize,
  pub class_type: usize,
  pub image_path: String,
  pub path_active: bool,
  pub step: TakeStep,
  /// The session created for this capture, once processing starts.
  pub session_id: Option<i64>,
  pub detected: Vec<DetectedRow>,
  pub cursor: usize,
  pub is_processing: bool,
}

impl TakePage {
  pub fn selected_subject(&self) -> Option<&Subject> {
    self.subjects.get(self.subject_cursor)
  }

  pub fn selected_class_type(&self) -> ClassType {
    ClassType::ALL[self.class_type % ClassType::ALL.len()]
  }

  pub fn present_count(&self) -> usize {
    self.detected.iter().filter(|r| r.present).count()
  }

  fn reset(&mut self) {
    let subjects = std::mem::take(&mut self.subjects);
    *self = TakePage {
      subjects,
      ..TakePage::default()
    };
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

impl App {
  pub(crate) async fn load_take(&mut self) {
    let Some(me) = self.session.identity() else {
      return;
    };

    self.take.reset();
    self.take.is_processing = true;
    let result = self
      .client
      .list_subjects(&SubjectQuery {
        teacher_id: Some(me.id),
        ..SubjectQuery::default()
      })
      .await;
    self.take.is_processing = false;

    match result {
      Ok(subjects) => self.take.subjects = subjects,
      Err(err) => self.fail("loading subjects", err),
    }
  }

  pub(crate) async fn take_key(&mut self, key: KeyEvent) -> Result<bool> {
    match self.take.step {
      TakeStep::Setup => self.take_setup_key(key).await,
      TakeStep::Results => self.take_results_key(key).await,
    }
  }

  async fn take_setup_key(&mut self, key: KeyEvent) -> Result<bool> {
    if self.take.path_active {
      match key.code {
        KeyCode::Esc | KeyCode::Enter => self.take.path_active = false,
        _ => {
          edit_text(&mut self.take.image_path, key);
        }
      }
      return Ok(true);
    }

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.take.subjects.len();
        if len > 0 && self.take.subject_cursor + 1 < len {
          self.take.subject_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.take.subject_cursor = self.take.subject_cursor.saturating_sub(1);
      }
      KeyCode::Char('t') => {
        self.take.class_type =
          (self.take.class_type + 1) % ClassType::ALL.len();
      }
      KeyCode::Char('i') => {
        self.take.path_active = true;
      }
      KeyCode::Char('p') | KeyCode::Enter => self.process_attendance().await,
      KeyCode::Char('c') => self.take.reset(),
      _ => return self.common_key(key).await,
    }
    Ok(true)
  }

  /// The two-step capture flow: create the session, then upload the
  /// photo for detection.
  async fn process_attendance(&mut self) {
    if self.take.is_processing {
      return;
    }

    let Some(subject_id) = self.take.selected_subject().map(|s| s.id) else {
      self.toast("Error: select a subject first");
      return;
    };
    let path = std::path::PathBuf::from(self.take.image_path.trim());
    if path.as_os_str().is_empty() {
      self.toast("Error: image path is required");
      return;
    }
    let bytes = match std::fs::read(&path) {
      Ok(bytes) => bytes,
      Err(e) => {
        self.toast(format!("Error: cannot read {}: {e}", path.display()));
        return;
      }
    };
    let file_name = path
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or("class.jpg")
      .to_string();

    let class_type = self.take.selected_class_type();
    self.take.is_processing = true;
    let outcome = async {
      let session = self
        .client
        .create_attendance_session(&NewAttendanceSession {
          subject_id,
          session_date: Utc::now(),
          class_type,
          notes: Some("Attendance taken via photo recognition".into()),
        })
        .await?;
      let processed = self
        .client
        .upload_attendance_image(session.id, &file_name, bytes)
        .await?;
      Ok::<_, rollcall_client::Error>((session.id, processed))
    }
    .await;
    self.take.is_processing = false;

    match outcome {
      Ok((session_id, processed)) => {
        self.take.session_id = Some(session_id);
        self.take.detected = processed
          .detected_students
          .into_iter()
          .map(|student| DetectedRow {
            present: student.detected,
            student,
          })
          .collect();
        self.take.cursor = 0;
        self.take.step = TakeStep::Results;
        let present = self.take.present_count();
        self.toast(format!("Detected {present} students present"));
      }
      Err(err) => self.fail("processing attendance", err),
    }
  }

  async fn take_results_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.take.detected.len();
        if len > 0 && self.take.cursor + 1 < len {
          self.take.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.take.cursor = self.take.cursor.saturating_sub(1);
      }
      KeyCode::Char(' ') => {
        let cursor = self.take.cursor;
        if let Some(row) = self.take.detected.get_mut(cursor) {
          row.present = !row.present;
        }
      }
      KeyCode::Char('s') => self.save_attendance().await,
      KeyCode::Char('c') | KeyCode::Esc => self.take.reset(),
      _ => return self.common_key(key).await,
    }
    Ok(true)
  }

  /// Persist one record per student with their final status. Marking the
  /// same (session, student) pair again replaces the earlier record, so
  /// manual toggles override the detection outcome server-side.
  async fn save_attendance(&mut self) {
    if self.take.is_processing {
      return;
    }
    let Some(session_id) = self.take.session_id else {
      return;
    };

    let marks: Vec<(i64, AttendanceStatus)> = self
      .take
      .detected
      .iter()
      .map(|row| {
        let status = if row.present {
          AttendanceStatus::Present
        } else {
          AttendanceStatus::Absent
        };
        (row.student.student_id, status)
      })
      .collect();
    let total = marks.len();
    let present = self.take.present_count();

    self.take.is_processing = true;
    let mut failures = 0usize;
    for (student_id, status) in marks {
      let record = NewAttendanceRecord {
        student_id,
        status,
        notes: None,
      };
      if let Err(err) = self.client.mark_attendance(session_id, &record).await
      {
        failures += 1;
        if err.is_authentication() {
          self.take.is_processing = false;
          self.fail("saving attendance", err);
          return;
        }
        tracing::warn!(student_id, %err, "failed to mark attendance");
      }
    }
    self.take.is_processing = false;

    if failures == 0 {
      self.toast(format!(
        "Saved attendance for {total} students ({present} present, {} absent)",
        total - present
      ));
      self.take.reset();
    } else {
      // Keep the results on screen so the save can be retried.
      self.toast(format!("Error: {failures} of {total} records not saved"));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(student_id: i64, detected: bool) -> DetectedRow {
    DetectedRow {
      student: DetectedStudent {
        student_id,
        name: format!("S{student_id}"),
        email: format!("s{student_id}@x.com"),
        prn: None,
        detected,
        confidence: detected.then_some(0.9),
        face_index: None,
      },
      present: detected,
    }
  }

  #[test]
  fn present_count_follows_manual_toggles() {
    let mut page = TakePage {
      detected: vec![row(1, true), row(2, false), row(3, true)],
      ..TakePage::default()
    };
    assert_eq!(page.present_count(), 2);

    page.detected[1].present = true;
    assert_eq!(page.present_count(), 3);
  }

  #[test]
  fn reset_keeps_the_subject_list_but_drops_the_capture() {
    let mut page = TakePage {
      image_path: "/tmp/class.jpg".into(),
      session_id: Some(7),
      detected: vec![row(1, true)],
      step: TakeStep::Results,
      ..TakePage::default()
    };
    page.reset();
    assert_eq!(page.step, TakeStep::Setup);
    assert!(page.detected.is_empty());
    assert!(page.session_id.is_none());
    assert!(page.image_path.is_empty());
  }

  #[test]
  fn class_type_selection_wraps() {
    let mut page = TakePage::default();
    assert_eq!(page.selected_class_type(), ClassType::Lecture);
    page.class_type = 2;
    assert_eq!(page.selected_class_type(), ClassType::Tutorial);
    page.class_type = 3;
    assert_eq!(page.selected_class_type(), ClassType::Lecture);
  }
}
