//! Admin subject management: list, search, create/edit, delete, roster
//! viewing, and enrollment.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_client::SubjectQuery;
use rollcall_core::{
  ValidationError,
  subject::{EnrolledStudent, NewSubject, Subject, SubjectPatch},
  user::User,
};

use crate::{
  app::App,
  pages::{clamp_cursor, edit_text},
};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SubjectsPage {
  pub subjects: Vec<Subject>,
  /// Teachers available for assignment, loaded alongside the subjects.
  pub teachers: Vec<User>,
  pub search: String,
  pub search_active: bool,
  pub cursor: usize,
  pub form:   Option<SubjectForm>,
  /// Subject id awaiting delete confirmation.
  pub confirm_delete: Option<i64>,
  pub roster: Option<RosterPane>,
  pub is_loading: bool,
}

impl SubjectsPage {
  pub fn filtered(&self) -> Vec<&Subject> {
    filter_subjects(&self.subjects, &self.search)
  }

  pub fn cursor_subject(&self) -> Option<&Subject> {
    self.filtered().get(self.cursor).copied()
  }
}

/// Roster pane for one subject, with an optional enroll picker over the
/// full student list.
pub struct RosterPane {
  pub subject_id:   i64,
  pub subject_name: String,
  pub students:     Vec<EnrolledStudent>,
  /// All students, for the enroll picker. Loaded on first use.
  pub candidates: Vec<User>,
  pub selecting:  bool,
  pub cursor:     usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectField {
  Name,
  Code,
  Description,
  Teacher,
}

#[derive(Debug, Clone)]
pub struct SubjectForm {
  /// `Some(id)` when editing an existing subject.
  pub editing: Option<i64>,
  pub name: String,
  pub code: String,
  pub description: String,
  /// Index into the teachers list; `None` leaves the subject unassigned.
  pub teacher_idx: Option<usize>,
  pub focus: SubjectField,
}

impl SubjectForm {
  pub fn blank() -> Self {
    Self {
      editing: None,
      name: String::new(),
      code: String::new(),
      description: String::new(),
      teacher_idx: None,
      focus: SubjectField::Name,
    }
  }

  pub fn for_subject(subject: &Subject, teachers: &[User]) -> Self {
    Self {
      editing: Some(subject.id),
      name: subject.name.clone(),
      code: subject.code.clone(),
      description: subject.description.clone().unwrap_or_default(),
      teacher_idx: subject
        .teacher_id
        .and_then(|id| teachers.iter().position(|t| t.id == id)),
      focus: SubjectField::Name,
    }
  }

  const FIELDS: [SubjectField; 4] = [
    SubjectField::Name,
    SubjectField::Code,
    SubjectField::Description,
    SubjectField::Teacher,
  ];

  fn move_focus(&mut self, forward: bool) {
    let here = Self::FIELDS
      .iter()
      .position(|f| *f == self.focus)
      .unwrap_or(0);
    let len = Self::FIELDS.len();
    let next = if forward { (here + 1) % len } else { (here + len - 1) % len };
    self.focus = Self::FIELDS[next];
  }

  /// Cycle Unassigned → teacher 0 → … → teacher n-1 → Unassigned.
  fn cycle_teacher(&mut self, teachers: usize, forward: bool) {
    if teachers == 0 {
      self.teacher_idx = None;
      return;
    }
    self.teacher_idx = if forward {
      match self.teacher_idx {
        None => Some(0),
        Some(i) if i + 1 < teachers => Some(i + 1),
        Some(_) => None,
      }
    } else {
      match self.teacher_idx {
        None => Some(teachers - 1),
        Some(0) => None,
        Some(i) => Some(i - 1),
      }
    };
  }
}

// ─── Pure helpers ────────────────────────────────────────────────────────────

/// Case-insensitive substring filter over name, code, description, and
/// the assigned teacher's name. Preserves input ordering among matches.
pub fn filter_subjects<'a>(
  subjects: &'a [Subject],
  query: &str,
) -> Vec<&'a Subject> {
  if query.is_empty() {
    return subjects.iter().collect();
  }
  let needle = query.to_lowercase();
  subjects
    .iter()
    .filter(|s| {
      s.name.to_lowercase().contains(&needle)
        || s.code.to_lowercase().contains(&needle)
        || s
          .description
          .as_ref()
          .is_some_and(|d| d.to_lowercase().contains(&needle))
        || s
          .teacher_name()
          .is_some_and(|t| t.to_lowercase().contains(&needle))
    })
    .collect()
}

fn build_new_subject(
  form: &SubjectForm,
  teachers: &[User],
) -> Result<NewSubject, ValidationError> {
  if form.name.trim().is_empty() {
    return Err(ValidationError::Missing("name"));
  }
  if form.code.trim().is_empty() {
    return Err(ValidationError::Missing("code"));
  }
  let description = form.description.trim();
  Ok(NewSubject {
    name: form.name.trim().to_string(),
    code: form.code.trim().to_string(),
    description: (!description.is_empty()).then(|| description.to_string()),
    teacher_id: form.teacher_idx.and_then(|i| teachers.get(i)).map(|t| t.id),
  })
}

fn build_subject_patch(
  form: &SubjectForm,
  teachers: &[User],
) -> Result<SubjectPatch, ValidationError> {
  let new_subject = build_new_subject(form, teachers)?;
  Ok(SubjectPatch {
    name:        Some(new_subject.name),
    code:        Some(new_subject.code),
    description: new_subject.description,
    teacher_id:  new_subject.teacher_id,
    is_active:   None,
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

impl App {
  pub(crate) async fn load_subjects_page(&mut self) {
    self.subjects.is_loading = true;
    let subjects = self.client.list_subjects(&SubjectQuery::default()).await;
    let teachers = self.client.list_teachers().await;
    self.subjects.is_loading = false;

    match subjects {
      Ok(subjects) => {
        self.subjects.subjects = subjects;
        self.subjects.cursor = 0;
      }
      Err(err) => {
        self.fail("loading subjects", err);
        return;
      }
    }
    match teachers {
      Ok(teachers) => self.subjects.teachers = teachers,
      Err(err) => self.fail("loading teachers", err),
    }
  }

  pub(crate) async fn subjects_key(&mut self, key: KeyEvent) -> Result<bool> {
    if self.subjects.form.is_some() {
      return self.subject_form_key(key).await;
    }
    if self.subjects.roster.is_some() {
      return self.roster_key(key).await;
    }
    if let Some(id) = self.subjects.confirm_delete {
      return self.confirm_subject_delete_key(key, id).await;
    }
    if self.subjects.search_active {
      match key.code {
        KeyCode::Esc => {
          self.subjects.search_active = false;
          self.subjects.search.clear();
          self.subjects.cursor = 0;
        }
        KeyCode::Enter => self.subjects.search_active = false,
        _ => {
          if edit_text(&mut self.subjects.search, key) {
            self.subjects.cursor = 0;
          }
        }
      }
      return Ok(true);
    }

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.subjects.filtered().len();
        if len > 0 && self.subjects.cursor + 1 < len {
          self.subjects.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.subjects.cursor = self.subjects.cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.subjects.search_active = true;
        self.subjects.search.clear();
        self.subjects.cursor = 0;
      }
      KeyCode::Char('a') => {
        self.subjects.form = Some(SubjectForm::blank());
      }
      KeyCode::Char('e') => {
        if let Some(subject) = self.subjects.cursor_subject().cloned() {
          self.subjects.form =
            Some(SubjectForm::for_subject(&subject, &self.subjects.teachers));
        }
      }
      KeyCode::Char('d') => {
        let id = self.subjects.cursor_subject().map(|s| s.id);
        if let Some(id) = id {
          self.subjects.confirm_delete = Some(id);
        }
      }
      KeyCode::Char('s') => self.open_roster().await,
      KeyCode::Char('r') => self.load_subjects_page().await,
      _ => return self.common_key(key).await,
    }
    Ok(true)
  }

  async fn subject_form_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.subjects.form = None;
        return Ok(true);
      }
      KeyCode::Enter => {
        self.submit_subject_form().await;
        return Ok(true);
      }
      _ => {}
    }

    let teachers = self.subjects.teachers.len();
    if let Some(form) = self.subjects.form.as_mut() {
      match key.code {
        KeyCode::Tab => form.move_focus(true),
        KeyCode::BackTab => form.move_focus(false),
        KeyCode::Left if form.focus == SubjectField::Teacher => {
          form.cycle_teacher(teachers, false)
        }
        KeyCode::Right if form.focus == SubjectField::Teacher => {
          form.cycle_teacher(teachers, true)
        }
        _ => {
          let field = match form.focus {
            SubjectField::Name => Some(&mut form.name),
            SubjectField::Code => Some(&mut form.code),
            SubjectField::Description => Some(&mut form.description),
            SubjectField::Teacher => None,
          };
          if let Some(field) = field {
            edit_text(field, key);
          }
        }
      }
    }
    Ok(true)
  }

  async fn submit_subject_form(&mut self) {
    if self.subjects.is_loading {
      return;
    }
    let Some(form) = self.subjects.form.clone() else {
      return;
    };

    match form.editing {
      Some(id) => {
        let patch = match build_subject_patch(&form, &self.subjects.teachers) {
          Ok(patch) => patch,
          Err(e) => {
            self.toast(format!("Error: {e}"));
            return;
          }
        };
        self.subjects.is_loading = true;
        let result = self.client.update_subject(id, &patch).await;
        self.subjects.is_loading = false;
        match result {
          Ok(updated) => {
            if let Some(slot) =
              self.subjects.subjects.iter_mut().find(|s| s.id == id)
            {
              *slot = updated;
            }
            self.subjects.form = None;
            self.toast("Subject updated");
          }
          Err(err) => self.fail("updating subject", err),
        }
      }
      None => {
        let new_subject =
          match build_new_subject(&form, &self.subjects.teachers) {
            Ok(new_subject) => new_subject,
            Err(e) => {
              self.toast(format!("Error: {e}"));
              return;
            }
          };
        self.subjects.is_loading = true;
        let result = self.client.create_subject(&new_subject).await;
        self.subjects.is_loading = false;
        match result {
          Ok(created) => {
            // The server's record, with its assigned id — never a
            // client-side placeholder.
            self.subjects.subjects.push(created);
            self.subjects.form = None;
            self.toast("Subject created");
          }
          Err(err) => self.fail("creating subject", err),
        }
      }
    }
  }

  async fn confirm_subject_delete_key(
    &mut self,
    key: KeyEvent,
    id: i64,
  ) -> Result<bool> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        self.subjects.confirm_delete = None;
        self.subjects.is_loading = true;
        let result = self.client.delete_subject(id).await;
        self.subjects.is_loading = false;
        match result {
          Ok(msg) => {
            self.subjects.subjects.retain(|s| s.id != id);
            self.subjects.cursor = clamp_cursor(
              self.subjects.cursor,
              self.subjects.filtered().len(),
            );
            self.toast(msg.message);
          }
          Err(err) => self.fail("deleting subject", err),
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.subjects.confirm_delete = None;
      }
      _ => {}
    }
    Ok(true)
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn open_roster(&mut self) {
    let Some((id, name)) = self
      .subjects
      .cursor_subject()
      .map(|s| (s.id, s.name.clone()))
    else {
      return;
    };

    self.subjects.is_loading = true;
    let result = self.client.subject_students(id).await;
    self.subjects.is_loading = false;

    match result {
      Ok(students) => {
        self.subjects.roster = Some(RosterPane {
          subject_id:   id,
          subject_name: name,
          students,
          candidates: Vec::new(),
          selecting: false,
          cursor: 0,
        });
      }
      Err(err) => self.fail("loading roster", err),
    }
  }

  async fn roster_key(&mut self, key: KeyEvent) -> Result<bool> {
    let selecting = self
      .subjects
      .roster
      .as_ref()
      .is_some_and(|r| r.selecting);

    match key.code {
      KeyCode::Esc => {
        if selecting {
          if let Some(roster) = self.subjects.roster.as_mut() {
            roster.selecting = false;
            roster.cursor = 0;
          }
        } else {
          self.subjects.roster = None;
        }
      }
      KeyCode::Char('e') if !selecting => self.start_enroll().await,
      KeyCode::Enter if selecting => self.submit_enroll().await,
      KeyCode::Down | KeyCode::Char('j') => {
        if let Some(roster) = self.subjects.roster.as_mut() {
          let len = if roster.selecting {
            roster.candidates.len()
          } else {
            roster.students.len()
          };
          if len > 0 && roster.cursor + 1 < len {
            roster.cursor += 1;
          }
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if let Some(roster) = self.subjects.roster.as_mut() {
          roster.cursor = roster.cursor.saturating_sub(1);
        }
      }
      _ => {}
    }
    Ok(true)
  }

  async fn start_enroll(&mut self) {
    if self
      .subjects
      .roster
      .as_ref()
      .is_some_and(|r| !r.candidates.is_empty())
    {
      if let Some(roster) = self.subjects.roster.as_mut() {
        roster.selecting = true;
        roster.cursor = 0;
      }
      return;
    }

    self.subjects.is_loading = true;
    let result = self.client.list_students().await;
    self.subjects.is_loading = false;

    match result {
      Ok(students) => {
        if let Some(roster) = self.subjects.roster.as_mut() {
          roster.candidates = students;
          roster.selecting = true;
          roster.cursor = 0;
        }
      }
      Err(err) => self.fail("loading students", err),
    }
  }

  async fn submit_enroll(&mut self) {
    let Some((subject_id, student_id)) =
      self.subjects.roster.as_ref().and_then(|r| {
        r.candidates.get(r.cursor).map(|s| (r.subject_id, s.id))
      })
    else {
      return;
    };

    self.subjects.is_loading = true;
    let result = self.client.enroll_student(subject_id, student_id).await;
    self.subjects.is_loading = false;

    match result {
      Ok(_) => {
        self.toast("Student enrolled");
        // Reload the roster so the new row carries the server's
        // enrollment date.
        let refreshed = self.client.subject_students(subject_id).await;
        match refreshed {
          Ok(students) => {
            if let Some(roster) = self.subjects.roster.as_mut() {
              roster.students = students;
              roster.selecting = false;
              roster.cursor = 0;
            }
          }
          Err(err) => self.fail("reloading roster", err),
        }
      }
      Err(err) => self.fail("enrolling student", err),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use rollcall_core::Role;

  fn teacher(id: i64, name: &str) -> User {
    User {
      id,
      name: name.into(),
      email: format!("{}@school.com", name.to_lowercase()),
      role: Role::Teacher,
      prn: None,
      is_active: true,
      face_registered: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn subject(
    id: i64,
    name: &str,
    code: &str,
    description: Option<&str>,
    teacher: Option<User>,
  ) -> Subject {
    Subject {
      id,
      name: name.into(),
      code: code.into(),
      description: description.map(Into::into),
      teacher_id: teacher.as_ref().map(|t| t.id),
      is_active: true,
      created_at: Utc::now(),
      updated_at: Utc::now(),
      teacher,
    }
  }

  #[test]
  fn filter_matches_name_description_and_teacher_name() {
    let subjects = vec![
      subject(
        1,
        "Databases",
        "CS305",
        Some("Storage and querying"),
        Some(teacher(10, "Grace")),
      ),
      subject(2, "Networks", "CS331", None, Some(teacher(11, "Vint"))),
      subject(3, "Graphics", "CS352", Some("Rendering"), None),
    ];

    let by_name: Vec<i64> =
      filter_subjects(&subjects, "data").iter().map(|s| s.id).collect();
    assert_eq!(by_name, [1]);

    let by_description: Vec<i64> = filter_subjects(&subjects, "RENDER")
      .iter()
      .map(|s| s.id)
      .collect();
    assert_eq!(by_description, [3]);

    let by_teacher: Vec<i64> =
      filter_subjects(&subjects, "grace").iter().map(|s| s.id).collect();
    assert_eq!(by_teacher, [1]);
  }

  #[test]
  fn filter_returns_exactly_the_matching_subset_in_order() {
    let subjects = vec![
      subject(5, "Compilers", "CS401", None, None),
      subject(1, "Calculus", "MA101", None, None),
      subject(9, "Chemistry", "CH110", None, None),
    ];
    // "c" matches all three by name; ordering must be untouched.
    let ids: Vec<i64> =
      filter_subjects(&subjects, "c").iter().map(|s| s.id).collect();
    assert_eq!(ids, [5, 1, 9]);

    // "cs4" matches only the compiler course's code.
    let ids: Vec<i64> =
      filter_subjects(&subjects, "cs4").iter().map(|s| s.id).collect();
    assert_eq!(ids, [5]);
  }

  #[test]
  fn new_subject_requires_name_and_code() {
    let teachers = vec![teacher(10, "Grace")];
    let mut form = SubjectForm::blank();
    assert_eq!(
      build_new_subject(&form, &teachers).unwrap_err(),
      ValidationError::Missing("name")
    );

    form.name = "Databases".into();
    assert_eq!(
      build_new_subject(&form, &teachers).unwrap_err(),
      ValidationError::Missing("code")
    );

    form.code = "CS305".into();
    form.teacher_idx = Some(0);
    let built = build_new_subject(&form, &teachers).unwrap();
    assert_eq!(built.teacher_id, Some(10));
    assert_eq!(built.description, None);
  }

  #[test]
  fn teacher_cycle_passes_through_unassigned() {
    let mut form = SubjectForm::blank();
    form.cycle_teacher(2, true);
    assert_eq!(form.teacher_idx, Some(0));
    form.cycle_teacher(2, true);
    assert_eq!(form.teacher_idx, Some(1));
    form.cycle_teacher(2, true);
    assert_eq!(form.teacher_idx, None);
    form.cycle_teacher(2, false);
    assert_eq!(form.teacher_idx, Some(1));
  }
}
