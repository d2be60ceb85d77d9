//! HTTP client and session gate for the rollcall backend.
//!
//! This is the only crate that performs network I/O or touches the
//! persisted session. The terminal UI above it consumes typed results and
//! never sees a raw response.
//!
//! The two halves are kept consistent by construction: [`ApiClient`] clears
//! the session when the backend answers 401, and [`Session::logout`] drops
//! the credential the client would otherwise keep attaching.

pub mod api;
pub mod error;
pub mod session;

pub use api::{ApiClient, SessionQuery, SubjectQuery, UserQuery};
pub use error::{Error, Result};
pub use session::{GuardOutcome, Identity, Session, SessionStore, guard};
