//! Application state machine: route table, gate-driven navigation, and
//! top-level key dispatch.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rollcall_client::{ApiClient, Error, GuardOutcome, Session};
use rollcall_core::Role;

use crate::pages::{
  login::LoginPage, student::StudentPage, subjects::SubjectsPage,
  take::TakePage, users::UsersPage, view::ViewPage,
};

// ─── Routes ──────────────────────────────────────────────────────────────────

/// Every screen the client can show. The path strings and role
/// requirements are the externally visible contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Login,
  Dashboard,
  AdminUsers,
  AdminSubjects,
  TakeAttendance,
  ViewAttendance,
  StudentAttendance,
  NotFound,
}

impl Route {
  pub fn path(self) -> &'static str {
    match self {
      Route::Login => "/login",
      Route::Dashboard => "/dashboard",
      Route::AdminUsers => "/admin/users",
      Route::AdminSubjects => "/admin/subjects",
      Route::TakeAttendance => "/teacher/attendance/take",
      Route::ViewAttendance => "/teacher/attendance/view",
      Route::StudentAttendance => "/student/attendance",
      Route::NotFound => "/404",
    }
  }

  /// Resolve a typed path. `None` means the not-found screen.
  pub fn from_path(path: &str) -> Option<Route> {
    match path.trim().trim_end_matches('/') {
      "" | "/" => Some(Route::Dashboard),
      "/login" => Some(Route::Login),
      "/dashboard" => Some(Route::Dashboard),
      "/admin/users" => Some(Route::AdminUsers),
      "/admin/subjects" => Some(Route::AdminSubjects),
      "/teacher/attendance/take" => Some(Route::TakeAttendance),
      "/teacher/attendance/view" => Some(Route::ViewAttendance),
      "/student/attendance" => Some(Route::StudentAttendance),
      _ => None,
    }
  }

  /// The allow-list handed to the gate. `None` admits any authenticated
  /// identity; login and not-found are public and bypass the gate.
  pub fn required_roles(self) -> Option<&'static [Role]> {
    match self {
      Route::AdminUsers | Route::AdminSubjects => Some(&[Role::Admin]),
      Route::TakeAttendance | Route::ViewAttendance => Some(&[Role::Teacher]),
      Route::StudentAttendance => Some(&[Role::Student]),
      Route::Login | Route::Dashboard | Route::NotFound => None,
    }
  }
}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub client:  ApiClient,
  pub session: Session,
  pub route:   Route,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Path prompt contents while goto mode is active.
  pub goto: Option<String>,

  /// The unmatched path the not-found screen reports.
  pub missing_path: String,

  pub login:    LoginPage,
  pub users:    UsersPage,
  pub subjects: SubjectsPage,
  pub take:     TakePage,
  pub view:     ViewPage,
  pub student:  StudentPage,
}

impl App {
  pub fn new(client: ApiClient, session: Session) -> Self {
    Self {
      client,
      session,
      route: Route::Login,
      status_msg: String::new(),
      goto: None,
      missing_path: String::new(),
      login: LoginPage::default(),
      users: UsersPage::default(),
      subjects: SubjectsPage::default(),
      take: TakePage::default(),
      view: ViewPage::default(),
      student: StudentPage::default(),
    }
  }

  /// Initial navigation after a restore attempt: straight to the
  /// dashboard when a session was adopted, the login screen otherwise.
  pub async fn start(&mut self) {
    self.navigate(Route::Dashboard).await;
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Gate-checked navigation. Every screen change goes through here, so
  /// the routing table cannot be bypassed by a page.
  pub async fn navigate(&mut self, route: Route) {
    if route == Route::Login {
      // The login screen redirects away when a session is already held.
      if self.session.is_authenticated() {
        self.route = Route::Dashboard;
      } else {
        self.route = Route::Login;
      }
      return;
    }

    if route == Route::NotFound {
      self.route = route;
      return;
    }

    match self.session.guard(route.required_roles()) {
      GuardOutcome::Allow => {
        tracing::debug!(path = route.path(), "navigate");
        self.route = route;
        self.load_route(route).await;
      }
      GuardOutcome::RedirectToLogin => {
        self.route = Route::Login;
      }
      GuardOutcome::RedirectToDefault => {
        self.route = Route::Dashboard;
      }
    }
  }

  /// Resolve a goto-prompt path; unmatched paths render not-found rather
  /// than redirecting anywhere.
  pub async fn go_to_path(&mut self, path: &str) {
    match Route::from_path(path) {
      Some(route) => self.navigate(route).await,
      None => {
        tracing::warn!(%path, "no route matches");
        self.missing_path = path.to_string();
        self.route = Route::NotFound;
      }
    }
  }

  async fn load_route(&mut self, route: Route) {
    match route {
      Route::AdminUsers => self.load_users().await,
      Route::AdminSubjects => self.load_subjects_page().await,
      Route::TakeAttendance => self.load_take().await,
      Route::ViewAttendance => self.load_view().await,
      Route::StudentAttendance => self.load_student().await,
      Route::Login | Route::Dashboard | Route::NotFound => {}
    }
  }

  // ── Status & errors ───────────────────────────────────────────────────────

  pub fn toast(&mut self, msg: impl Into<String>) {
    self.status_msg = msg.into();
  }

  /// Surface a page-level API failure. Prior view state stays as it was;
  /// an authentication failure additionally lands on the login screen
  /// (the session itself is already cleared by the client).
  pub fn fail(&mut self, what: &str, err: Error) {
    tracing::warn!(%what, %err, "request failed");
    self.status_msg = format!("Error: {err}");
    if err.is_authentication() {
      self.route = Route::Login;
    }
  }

  // ── Key dispatch ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return Ok(false);
    }

    // A fresh keypress invalidates the previous toast.
    if !self.status_msg.is_empty() {
      self.status_msg.clear();
    }

    // Goto prompt captures everything while open.
    if self.goto.is_some() {
      return self.goto_key(key).await;
    }

    match self.route {
      Route::Login => self.login_key(key).await,
      Route::Dashboard => self.dashboard_key(key).await,
      Route::AdminUsers => self.users_key(key).await,
      Route::AdminSubjects => self.subjects_key(key).await,
      Route::TakeAttendance => self.take_key(key).await,
      Route::ViewAttendance => self.view_key(key).await,
      Route::StudentAttendance => self.student_key(key).await,
      Route::NotFound => self.not_found_key(key).await,
    }
  }

  async fn goto_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.goto = None;
      }
      KeyCode::Enter => {
        if let Some(path) = self.goto.take() {
          self.go_to_path(&path).await;
        }
      }
      KeyCode::Backspace => {
        if let Some(path) = &mut self.goto {
          path.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(path) = &mut self.goto {
          path.push(c);
        }
      }
      _ => {}
    }
    Ok(true)
  }

  async fn not_found_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Enter | KeyCode::Esc => {
        self.navigate(Route::Dashboard).await;
        Ok(true)
      }
      _ => self.common_key(key).await,
    }
  }

  /// Fallback keys shared by every screen that is not capturing text.
  pub(crate) async fn common_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char(':') => {
        self.goto = Some(String::new());
      }
      KeyCode::Char('x') if self.session.is_authenticated() => {
        self.session.logout();
        self.login = LoginPage::default();
        self.route = Route::Login;
        self.toast("Signed out");
      }
      KeyCode::Esc
        if !matches!(self.route, Route::Dashboard | Route::Login) =>
      {
        self.navigate(Route::Dashboard).await;
      }
      _ => {}
    }
    Ok(true)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_route_round_trips_through_its_path() {
    for route in [
      Route::Login,
      Route::Dashboard,
      Route::AdminUsers,
      Route::AdminSubjects,
      Route::TakeAttendance,
      Route::ViewAttendance,
      Route::StudentAttendance,
    ] {
      assert_eq!(Route::from_path(route.path()), Some(route));
    }
  }

  #[test]
  fn root_and_trailing_slashes_resolve_to_dashboard() {
    assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
    assert_eq!(Route::from_path("/dashboard/"), Some(Route::Dashboard));
  }

  #[test]
  fn unmatched_paths_do_not_resolve() {
    assert_eq!(Route::from_path("/admin"), None);
    assert_eq!(Route::from_path("/teacher/attendance"), None);
    assert_eq!(Route::from_path("/nope"), None);
  }

  #[test]
  fn role_requirements_match_the_routing_table() {
    assert_eq!(Route::AdminUsers.required_roles(), Some(&[Role::Admin][..]));
    assert_eq!(
      Route::AdminSubjects.required_roles(),
      Some(&[Role::Admin][..])
    );
    assert_eq!(
      Route::TakeAttendance.required_roles(),
      Some(&[Role::Teacher][..])
    );
    assert_eq!(
      Route::ViewAttendance.required_roles(),
      Some(&[Role::Teacher][..])
    );
    assert_eq!(
      Route::StudentAttendance.required_roles(),
      Some(&[Role::Student][..])
    );
    // Any authenticated identity may see the dashboard; login and
    // not-found carry no role requirement at all.
    assert_eq!(Route::Dashboard.required_roles(), None);
    assert_eq!(Route::Login.required_roles(), None);
    assert_eq!(Route::NotFound.required_roles(), None);
  }
}
