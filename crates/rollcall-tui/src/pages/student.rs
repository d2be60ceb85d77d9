//! Student attendance summary: per-subject totals and the overall
//! percentage, with the standing label thresholds.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_core::attendance::StudentAttendanceSummary;

use crate::app::App;

#[derive(Default)]
pub struct StudentPage {
  pub summary: Option<StudentAttendanceSummary>,
  pub is_loading: bool,
}

/// Standing label for an attendance percentage.
pub fn standing(percentage: f64) -> &'static str {
  if percentage >= 85.0 {
    "Good"
  } else if percentage >= 75.0 {
    "Warning"
  } else {
    "Critical"
  }
}

impl App {
  pub(crate) async fn load_student(&mut self) {
    let Some(me) = self.session.identity() else {
      return;
    };

    self.student.is_loading = true;
    let result = self.client.student_attendance(me.id).await;
    self.student.is_loading = false;

    match result {
      Ok(summary) => self.student.summary = Some(summary),
      Err(err) => self.fail("loading attendance summary", err),
    }
  }

  pub(crate) async fn student_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Char('r') => {
        self.load_student().await;
        Ok(true)
      }
      _ => self.common_key(key).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standing_thresholds() {
    assert_eq!(standing(92.0), "Good");
    assert_eq!(standing(85.0), "Good");
    assert_eq!(standing(84.9), "Warning");
    assert_eq!(standing(75.0), "Warning");
    assert_eq!(standing(74.9), "Critical");
    assert_eq!(standing(0.0), "Critical");
  }
}
