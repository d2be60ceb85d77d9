//! Dashboard: role-specific greeting and quick actions.
//!
//! Both the tagline and the action set are exhaustive matches on
//! [`Role`], so a new role fails to compile until every screen has
//! decided what to show it.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_core::Role;

use crate::app::{App, Route};

pub struct QuickAction {
  pub title: &'static str,
  pub description: &'static str,
  pub route: Route,
}

pub fn welcome(role: Role) -> (&'static str, &'static str) {
  match role {
    Role::Admin => (
      "Manage your system",
      "Oversee users, subjects, and system-wide attendance",
    ),
    Role::Teacher => (
      "Ready to take attendance?",
      "Capture attendance photos and manage your class records",
    ),
    Role::Student => (
      "Your attendance at a glance",
      "Track your attendance across all enrolled subjects",
    ),
  }
}

pub fn quick_actions(role: Role) -> Vec<QuickAction> {
  match role {
    Role::Admin => vec![
      QuickAction {
        title: "Manage Users",
        description: "Add, edit, and manage system users",
        route: Route::AdminUsers,
      },
      QuickAction {
        title: "Manage Subjects",
        description: "Configure subjects and assign teachers",
        route: Route::AdminSubjects,
      },
    ],
    Role::Teacher => vec![
      QuickAction {
        title: "Take Attendance",
        description: "Capture attendance using photos",
        route: Route::TakeAttendance,
      },
      QuickAction {
        title: "View Attendance",
        description: "Review past attendance records",
        route: Route::ViewAttendance,
      },
    ],
    Role::Student => vec![QuickAction {
      title: "My Attendance",
      description: "View your attendance records and percentages",
      route: Route::StudentAttendance,
    }],
  }
}

impl App {
  pub(crate) async fn dashboard_key(&mut self, key: KeyEvent) -> Result<bool> {
    let Some(identity) = self.session.identity() else {
      // The gate normally prevents this; belt and braces for a session
      // that expired between frames.
      self.route = Route::Login;
      return Ok(true);
    };

    if let KeyCode::Char(c) = key.code {
      if let Some(n) = c.to_digit(10) {
        let actions = quick_actions(identity.role);
        if n >= 1 {
          if let Some(action) = actions.get(n as usize - 1) {
            let route = action.route;
            self.navigate(route).await;
          }
        }
        return Ok(true);
      }
    }

    self.common_key(key).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rollcall_client::{GuardOutcome, Identity, guard};

  #[test]
  fn quick_actions_stay_within_each_roles_allow_list() {
    for role in Role::ALL {
      let identity = Identity {
        id:    1,
        name:  "T".into(),
        email: "t@x.com".into(),
        role,
      };
      for action in quick_actions(role) {
        assert_eq!(
          guard(Some(&identity), action.route.required_roles()),
          GuardOutcome::Allow,
          "{role} offered {}, which its own gate rejects",
          action.route.path(),
        );
      }
    }
  }
}
