//! Admin user management: list, search, create/edit, delete, and face
//! registration for students.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_client::UserQuery;
use rollcall_core::{
  Role, ValidationError,
  user::{NewUser, User, UserPatch},
};

use crate::{
  app::App,
  pages::{clamp_cursor, edit_text},
};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UsersPage {
  pub users:  Vec<User>,
  pub search: String,
  pub search_active: bool,
  pub cursor: usize,
  pub form:   Option<UserForm>,
  /// User id awaiting delete confirmation.
  pub confirm_delete: Option<i64>,
  pub face_prompt: Option<FacePrompt>,
  pub is_loading: bool,
}

impl UsersPage {
  pub fn filtered(&self) -> Vec<&User> {
    filter_users(&self.users, &self.search)
  }

  pub fn cursor_user(&self) -> Option<&User> {
    self.filtered().get(self.cursor).copied()
  }
}

/// Path prompt for enrolling a student's reference face.
#[derive(Debug, Clone)]
pub struct FacePrompt {
  pub student_id:   i64,
  pub student_name: String,
  pub path:         String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
  Name,
  Email,
  Password,
  ConfirmPassword,
  Role,
  Prn,
  Active,
}

#[derive(Debug, Clone)]
pub struct UserForm {
  /// `Some(id)` when editing an existing user.
  pub editing: Option<i64>,
  pub name:    String,
  pub email:   String,
  pub password: String,
  pub confirm_password: String,
  pub role:    Role,
  pub prn:     String,
  pub is_active: bool,
  pub focus:   UserField,
}

impl UserForm {
  pub fn blank() -> Self {
    Self {
      editing: None,
      name: String::new(),
      email: String::new(),
      password: String::new(),
      confirm_password: String::new(),
      role: Role::Student,
      prn: String::new(),
      is_active: true,
      focus: UserField::Name,
    }
  }

  pub fn for_user(user: &User) -> Self {
    Self {
      editing: Some(user.id),
      name: user.name.clone(),
      email: user.email.clone(),
      password: String::new(),
      confirm_password: String::new(),
      role: user.role,
      prn: user.prn.clone().unwrap_or_default(),
      is_active: user.is_active,
      focus: UserField::Name,
    }
  }

  pub fn is_editing(&self) -> bool {
    self.editing.is_some()
  }

  /// Focus order differs between create (credentials present) and edit
  /// (credentials immutable, active flag exposed).
  pub fn fields(&self) -> &'static [UserField] {
    if self.is_editing() {
      &[
        UserField::Name,
        UserField::Email,
        UserField::Role,
        UserField::Active,
      ]
    } else {
      &[
        UserField::Name,
        UserField::Email,
        UserField::Password,
        UserField::ConfirmPassword,
        UserField::Role,
        UserField::Prn,
      ]
    }
  }

  fn move_focus(&mut self, forward: bool) {
    let fields = self.fields();
    let here = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
    let next = if forward {
      (here + 1) % fields.len()
    } else {
      (here + fields.len() - 1) % fields.len()
    };
    self.focus = fields[next];
  }

  fn cycle_role(&mut self) {
    let here = Role::ALL.iter().position(|r| *r == self.role).unwrap_or(0);
    self.role = Role::ALL[(here + 1) % Role::ALL.len()];
  }
}

// ─── Pure helpers ────────────────────────────────────────────────────────────

/// Case-insensitive substring filter over name, email, and prn.
/// Preserves the input ordering among matches.
pub fn filter_users<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
  if query.is_empty() {
    return users.iter().collect();
  }
  let needle = query.to_lowercase();
  users
    .iter()
    .filter(|u| {
      u.name.to_lowercase().contains(&needle)
        || u.email.to_lowercase().contains(&needle)
        || u
          .prn
          .as_ref()
          .is_some_and(|p| p.to_lowercase().contains(&needle))
    })
    .collect()
}

fn build_new_user(form: &UserForm) -> Result<NewUser, ValidationError> {
  if form.name.trim().is_empty() {
    return Err(ValidationError::Missing("name"));
  }
  if form.email.trim().is_empty() {
    return Err(ValidationError::Missing("email"));
  }
  if form.password.is_empty() {
    return Err(ValidationError::Missing("password"));
  }
  if form.password != form.confirm_password {
    return Err(ValidationError::PasswordMismatch);
  }
  Ok(NewUser {
    name:     form.name.trim().to_string(),
    email:    form.email.trim().to_string(),
    password: form.password.clone(),
    role:     form.role,
    prn:      {
      let prn = form.prn.trim();
      (!prn.is_empty()).then(|| prn.to_string())
    },
  })
}

fn build_user_patch(form: &UserForm) -> Result<UserPatch, ValidationError> {
  if form.name.trim().is_empty() {
    return Err(ValidationError::Missing("name"));
  }
  if form.email.trim().is_empty() {
    return Err(ValidationError::Missing("email"));
  }
  Ok(UserPatch {
    name:      Some(form.name.trim().to_string()),
    email:     Some(form.email.trim().to_string()),
    role:      Some(form.role),
    is_active: Some(form.is_active),
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

impl App {
  pub(crate) async fn load_users(&mut self) {
    self.users.is_loading = true;
    let result = self.client.list_users(&UserQuery::default()).await;
    self.users.is_loading = false;

    match result {
      Ok(users) => {
        self.users.users = users;
        self.users.cursor = 0;
      }
      Err(err) => self.fail("loading users", err),
    }
  }

  pub(crate) async fn users_key(&mut self, key: KeyEvent) -> Result<bool> {
    if self.users.form.is_some() {
      return self.user_form_key(key).await;
    }
    if self.users.face_prompt.is_some() {
      return self.face_prompt_key(key).await;
    }
    if let Some(id) = self.users.confirm_delete {
      return self.confirm_user_delete_key(key, id).await;
    }
    if self.users.search_active {
      match key.code {
        KeyCode::Esc => {
          self.users.search_active = false;
          self.users.search.clear();
          self.users.cursor = 0;
        }
        KeyCode::Enter => self.users.search_active = false,
        _ => {
          if edit_text(&mut self.users.search, key) {
            self.users.cursor = 0;
          }
        }
      }
      return Ok(true);
    }

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.users.filtered().len();
        if len > 0 && self.users.cursor + 1 < len {
          self.users.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.users.cursor = self.users.cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.users.search_active = true;
        self.users.search.clear();
        self.users.cursor = 0;
      }
      KeyCode::Char('a') => {
        self.users.form = Some(UserForm::blank());
      }
      KeyCode::Char('e') => {
        if let Some(user) = self.users.cursor_user().cloned() {
          self.users.form = Some(UserForm::for_user(&user));
        }
      }
      KeyCode::Char('d') => {
        let id = self.users.cursor_user().map(|u| u.id);
        if let Some(id) = id {
          self.users.confirm_delete = Some(id);
        }
      }
      KeyCode::Char('f') => {
        let target = self
          .users
          .cursor_user()
          .map(|u| (u.id, u.name.clone(), u.role));
        match target {
          Some((id, name, Role::Student)) => {
            self.users.face_prompt = Some(FacePrompt {
              student_id:   id,
              student_name: name,
              path:         String::new(),
            });
          }
          Some(_) => self.toast("Face registration is for students"),
          None => {}
        }
      }
      KeyCode::Char('r') => self.load_users().await,
      _ => return self.common_key(key).await,
    }
    Ok(true)
  }

  async fn user_form_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.users.form = None;
        return Ok(true);
      }
      KeyCode::Enter => {
        self.submit_user_form().await;
        return Ok(true);
      }
      _ => {}
    }

    if let Some(form) = self.users.form.as_mut() {
      match key.code {
        KeyCode::Tab => form.move_focus(true),
        KeyCode::BackTab => form.move_focus(false),
        KeyCode::Left | KeyCode::Right if form.focus == UserField::Role => {
          form.cycle_role()
        }
        KeyCode::Char(' ') if form.focus == UserField::Active => {
          form.is_active = !form.is_active;
        }
        _ => {
          let field = match form.focus {
            UserField::Name => Some(&mut form.name),
            UserField::Email => Some(&mut form.email),
            UserField::Password => Some(&mut form.password),
            UserField::ConfirmPassword => Some(&mut form.confirm_password),
            UserField::Prn => Some(&mut form.prn),
            UserField::Role | UserField::Active => None,
          };
          if let Some(field) = field {
            edit_text(field, key);
          }
        }
      }
    }
    Ok(true)
  }

  async fn submit_user_form(&mut self) {
    if self.users.is_loading {
      return;
    }
    let Some(form) = self.users.form.clone() else {
      return;
    };

    match form.editing {
      Some(id) => {
        let patch = match build_user_patch(&form) {
          Ok(patch) => patch,
          Err(e) => {
            self.toast(format!("Error: {e}"));
            return;
          }
        };
        self.users.is_loading = true;
        let result = self.client.update_user(id, &patch).await;
        self.users.is_loading = false;
        match result {
          Ok(updated) => {
            // Re-render from the server's record, not the form.
            if let Some(slot) =
              self.users.users.iter_mut().find(|u| u.id == id)
            {
              *slot = updated;
            }
            self.users.form = None;
            self.toast("User updated");
          }
          Err(err) => self.fail("updating user", err),
        }
      }
      None => {
        let new_user = match build_new_user(&form) {
          Ok(new_user) => new_user,
          Err(e) => {
            self.toast(format!("Error: {e}"));
            return;
          }
        };
        self.users.is_loading = true;
        let result = self.client.create_user(&new_user).await;
        self.users.is_loading = false;
        match result {
          Ok(created) => {
            self.users.users.push(created);
            self.users.form = None;
            self.toast("User created");
          }
          Err(err) => self.fail("creating user", err),
        }
      }
    }
  }

  async fn confirm_user_delete_key(
    &mut self,
    key: KeyEvent,
    id: i64,
  ) -> Result<bool> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        self.users.confirm_delete = None;
        self.users.is_loading = true;
        let result = self.client.delete_user(id).await;
        self.users.is_loading = false;
        match result {
          Ok(msg) => {
            self.users.users.retain(|u| u.id != id);
            self.users.cursor =
              clamp_cursor(self.users.cursor, self.users.filtered().len());
            self.toast(msg.message);
          }
          Err(err) => self.fail("deleting user", err),
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.users.confirm_delete = None;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn face_prompt_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.users.face_prompt = None;
      }
      KeyCode::Enter => self.submit_face_registration().await,
      _ => {
        if let Some(prompt) = self.users.face_prompt.as_mut() {
          edit_text(&mut prompt.path, key);
        }
      }
    }
    Ok(true)
  }

  async fn submit_face_registration(&mut self) {
    if self.users.is_loading {
      return;
    }
    let Some(prompt) = self.users.face_prompt.clone() else {
      return;
    };

    let path = std::path::PathBuf::from(prompt.path.trim());
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
      .unwrap_or("face.jpg")
      .to_string();

    self.users.is_loading = true;
    let result = self
      .client
      .register_face(prompt.student_id, &file_name, bytes)
      .await;
    self.users.is_loading = false;

    match result {
      Ok(msg) => {
        self.users.face_prompt = None;
        self.toast(msg.message);
        // Reload so face_registered reflects the backend's view.
        self.load_users().await;
      }
      Err(err) => self.fail("registering face", err),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn user(id: i64, name: &str, email: &str, prn: Option<&str>) -> User {
    User {
      id,
      name: name.into(),
      email: email.into(),
      role: Role::Student,
      prn: prn.map(Into::into),
      is_active: true,
      face_registered: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn filter_matches_name_email_and_prn_case_insensitively() {
    let users = vec![
      user(1, "Alice Liddell", "alice@school.com", Some("PRN001")),
      user(2, "Bob Stone", "bob@school.com", None),
      user(3, "Carol Adams", "carol@uni.edu", Some("PRN777")),
    ];

    let by_name: Vec<i64> =
      filter_users(&users, "aLiCe").iter().map(|u| u.id).collect();
    assert_eq!(by_name, [1]);

    let by_email: Vec<i64> =
      filter_users(&users, "school.com").iter().map(|u| u.id).collect();
    assert_eq!(by_email, [1, 2]);

    let by_prn: Vec<i64> =
      filter_users(&users, "prn7").iter().map(|u| u.id).collect();
    assert_eq!(by_prn, [3]);
  }

  #[test]
  fn filter_preserves_input_ordering_among_matches() {
    let users = vec![
      user(9, "Zed A", "z@x.com", None),
      user(2, "Ann A", "a@x.com", None),
      user(5, "Mia A", "m@x.com", None),
    ];
    let ids: Vec<i64> =
      filter_users(&users, "a").iter().map(|u| u.id).collect();
    // Everyone matches; nothing is re-sorted.
    assert_eq!(ids, [9, 2, 5]);
  }

  #[test]
  fn empty_query_returns_everything() {
    let users = vec![user(1, "A", "a@x.com", None)];
    assert_eq!(filter_users(&users, "").len(), 1);
  }

  #[test]
  fn new_user_requires_the_credential_fields() {
    let mut form = UserForm::blank();
    form.name = "Dana".into();
    form.email = "dana@x.com".into();
    assert_eq!(
      build_new_user(&form).unwrap_err(),
      ValidationError::Missing("password")
    );

    form.password = "secret".into();
    form.confirm_password = "secrot".into();
    assert_eq!(
      build_new_user(&form).unwrap_err(),
      ValidationError::PasswordMismatch
    );

    form.confirm_password = "secret".into();
    let built = build_new_user(&form).unwrap();
    assert_eq!(built.email, "dana@x.com");
    assert_eq!(built.prn, None);
  }

  #[test]
  fn patch_keeps_credentials_out_and_requires_identity_fields() {
    let existing = user(4, "Eve", "eve@x.com", None);
    let mut form = UserForm::for_user(&existing);
    form.name.clear();
    assert_eq!(
      build_user_patch(&form).unwrap_err(),
      ValidationError::Missing("name")
    );

    form.name = "Eve Moved".into();
    form.is_active = false;
    let patch = build_user_patch(&form).unwrap();
    assert_eq!(patch.name.as_deref(), Some("Eve Moved"));
    assert_eq!(patch.is_active, Some(false));
  }
}
