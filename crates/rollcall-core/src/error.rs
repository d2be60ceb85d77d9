//! Client-side form validation errors.
//!
//! These are produced and consumed entirely inside the UI; a value that
//! fails validation is never sent to the backend.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  Missing(&'static str),

  #[error("passwords do not match")]
  PasswordMismatch,
}
