//! Screen state and key handling — one module per route.
//!
//! Each module owns its page's ephemeral state (search string, cursor,
//! open form, loading flag) and contributes key handlers as `impl App`
//! blocks. Nothing here talks to the network except through
//! [`rollcall_client::ApiClient`].

pub mod dashboard;
pub mod login;
pub mod student;
pub mod subjects;
pub mod take;
pub mod users;
pub mod view;

use crossterm::event::{KeyCode, KeyEvent};

/// Apply a key to a plain text field. Returns `true` when the key was a
/// text edit and was consumed.
pub(crate) fn edit_text(field: &mut String, key: KeyEvent) -> bool {
  match key.code {
    KeyCode::Char(c) => {
      field.push(c);
      true
    }
    KeyCode::Backspace => {
      field.pop();
      true
    }
    _ => false,
  }
}

/// Clamp a cursor after the list under it changed size.
pub(crate) fn clamp_cursor(cursor: usize, len: usize) -> usize {
  if len == 0 { 0 } else { cursor.min(len - 1) }
}
