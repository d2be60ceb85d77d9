//! Teacher attendance review: past sessions, filterable by subject, with
//! a per-session record pane.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_client::{SessionQuery, SubjectQuery};
use rollcall_core::{
  attendance::{AttendanceRecord, AttendanceSession},
  subject::Subject,
};

use crate::app::App;

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ViewPage {
  /// The signed-in teacher's subjects, for the filter cycle.
  pub subjects: Vec<Subject>,
  /// Index into `subjects`; `None` shows every session.
  pub subject_filter: Option<usize>,
  pub sessions: Vec<AttendanceSession>,
  pub cursor: usize,
  /// Records of the selected session, when the detail pane is open.
  pub records: Option<Vec<AttendanceRecord>>,
  pub is_loading: bool,
}

impl ViewPage {
  pub fn cursor_session(&self) -> Option<&AttendanceSession> {
    self.sessions.get(self.cursor)
  }

  pub fn filter_subject(&self) -> Option<&Subject> {
    self.subject_filter.and_then(|i| self.subjects.get(i))
  }

  /// Subject name lookup for a session row.
  pub fn subject_name(&self, subject_id: i64) -> Option<&str> {
    self
      .subjects
      .iter()
      .find(|s| s.id == subject_id)
      .map(|s| s.name.as_str())
  }

  fn cycle_filter(&mut self) {
    self.subject_filter = match self.subject_filter {
      None if !self.subjects.is_empty() => Some(0),
      None => None,
      Some(i) if i + 1 < self.subjects.len() => Some(i + 1),
      Some(_) => None,
    };
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

impl App {
  pub(crate) async fn load_view(&mut self) {
    let Some(me) = self.session.identity() else {
      return;
    };

    self.view = ViewPage::default();
    self.view.is_loading = true;
    let subjects = self
      .client
      .list_subjects(&SubjectQuery {
        teacher_id: Some(me.id),
        ..SubjectQuery::default()
      })
      .await;
    self.view.is_loading = false;

    match subjects {
      Ok(subjects) => self.view.subjects = subjects,
      Err(err) => {
        self.fail("loading subjects", err);
        return;
      }
    }
    self.load_view_sessions().await;
  }

  async fn load_view_sessions(&mut self) {
    let Some(me) = self.session.identity() else {
      return;
    };
    let subject_id = self.view.filter_subject().map(|s| s.id);

    self.view.is_loading = true;
    let result = self
      .client
      .list_attendance_sessions(&SessionQuery {
        teacher_id: Some(me.id),
        subject_id,
        ..SessionQuery::default()
      })
      .await;
    self.view.is_loading = false;

    match result {
      Ok(sessions) => {
        self.view.sessions = sessions;
        self.view.cursor = 0;
        self.view.records = None;
      }
      Err(err) => self.fail("loading sessions", err),
    }
  }

  pub(crate) async fn view_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc if self.view.records.is_some() => {
        self.view.records = None;
      }
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.view.sessions.len();
        if len > 0 && self.view.cursor + 1 < len {
          self.view.cursor += 1;
          self.view.records = None;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.view.cursor > 0 {
          self.view.cursor -= 1;
          self.view.records = None;
        }
      }
      KeyCode::Char('f') => {
        self.view.cycle_filter();
        self.load_view_sessions().await;
      }
      KeyCode::Enter => self.open_session_records().await,
      KeyCode::Char('r') => self.load_view_sessions().await,
      _ => return self.common_key(key).await,
    }
    Ok(true)
  }

  async fn open_session_records(&mut self) {
    let Some(session_id) = self.view.cursor_session().map(|s| s.id) else {
      return;
    };

    self.view.is_loading = true;
    let result = self.client.session_records(session_id).await;
    self.view.is_loading = false;

    match result {
      Ok(records) => self.view.records = Some(records),
      Err(err) => self.fail("loading records", err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn subject(id: i64, name: &str) -> Subject {
    Subject {
      id,
      name: name.into(),
      code: format!("CS{id}"),
      description: None,
      teacher_id: Some(1),
      is_active: true,
      created_at: Utc::now(),
      updated_at: Utc::now(),
      teacher: None,
    }
  }

  #[test]
  fn subject_filter_cycles_through_all_and_back_to_none() {
    let mut page = ViewPage {
      subjects: vec![subject(1, "A"), subject(2, "B")],
      ..ViewPage::default()
    };
    assert!(page.filter_subject().is_none());

    page.cycle_filter();
    assert_eq!(page.filter_subject().map(|s| s.id), Some(1));
    page.cycle_filter();
    assert_eq!(page.filter_subject().map(|s| s.id), Some(2));
    page.cycle_filter();
    assert!(page.filter_subject().is_none());
  }

  #[test]
  fn filter_cycle_with_no_subjects_stays_empty() {
    let mut page = ViewPage::default();
    page.cycle_filter();
    assert!(page.filter_subject().is_none());
  }
}
