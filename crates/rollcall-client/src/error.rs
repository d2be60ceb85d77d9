//! Error taxonomy for requests against the backend.

use thiserror::Error;

/// An error surfaced by [`crate::ApiClient`] methods.
#[derive(Debug, Error)]
pub enum Error {
  /// The request never completed: connect, TLS, or body-decode failure.
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  /// The backend rejected the bearer credential (401). The session has
  /// already been cleared by the time this is returned.
  #[error("authentication failed, please log in again")]
  Authentication,

  /// Any other non-2xx response, carrying the server-provided message or
  /// an `HTTP <status>` fallback when the body was not parseable.
  #[error("{message}")]
  Request { status: u16, message: String },
}

impl Error {
  /// True when this error forced the session back to anonymous.
  pub fn is_authentication(&self) -> bool {
    matches!(self, Error::Authentication)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
