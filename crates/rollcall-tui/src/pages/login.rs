//! Login screen: credential form and submission.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use rollcall_core::ValidationError;

use crate::{
  app::{App, Route},
  pages::edit_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
  #[default]
  Email,
  Password,
}

#[derive(Default)]
pub struct LoginPage {
  pub email:    String,
  pub password: String,
  pub focus:    LoginField,
  pub is_loading: bool,
}

impl LoginPage {
  fn validate(&self) -> Result<(), ValidationError> {
    if self.email.trim().is_empty() {
      return Err(ValidationError::Missing("email"));
    }
    if self.password.is_empty() {
      return Err(ValidationError::Missing("password"));
    }
    Ok(())
  }
}

impl App {
  pub(crate) async fn login_key(&mut self, key: KeyEvent) -> Result<bool> {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
        self.login.focus = match self.login.focus {
          LoginField::Email => LoginField::Password,
          LoginField::Password => LoginField::Email,
        };
      }
      KeyCode::Enter => self.submit_login().await,
      _ => {
        // Everything else edits the focused field. Deliberately no
        // fall-through to common keys: 'q', ':' and 'x' are legitimate
        // credential characters. Ctrl-C still quits.
        let field = match self.login.focus {
          LoginField::Email => &mut self.login.email,
          LoginField::Password => &mut self.login.password,
        };
        edit_text(field, key);
      }
    }
    Ok(true)
  }

  async fn submit_login(&mut self) {
    if self.login.is_loading {
      return;
    }
    if let Err(e) = self.login.validate() {
      self.toast(format!("Error: {e}"));
      return;
    }

    self.login.is_loading = true;
    let email = self.login.email.trim().to_string();
    let password = self.login.password.clone();
    let result = self.client.login(&email, &password).await;
    self.login.is_loading = false;

    match result {
      Ok(identity) => {
        self.login = LoginPage::default();
        self.navigate(Route::Dashboard).await;
        self.toast(format!("Hello, {}!", identity.name));
      }
      Err(err) => {
        // Wrong credentials leave any prior session untouched; only the
        // typed password is dropped.
        self.login.password.clear();
        self.fail("login", err);
      }
    }
  }
}
