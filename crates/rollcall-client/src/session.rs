//! The session gate: who is signed in, and what they may see.
//!
//! [`Session`] is the single owner of the identity/credential pair. It has
//! exactly three mutation entry points (`establish`, `logout`, `restore`)
//! plus [`Session::expire`], the 401 signal from the API client. The
//! routing decision itself lives in the pure [`guard`] function so it can
//! be tested without any session at all.

use std::{
  fs, io,
  path::{Path, PathBuf},
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use rollcall_core::{Role, user::User};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The authenticated user's snapshot held client-side: enough to greet and
/// to route, nothing more. Replaced wholesale on each login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:    i64,
  pub name:  String,
  pub email: String,
  pub role:  Role,
}

impl From<&User> for Identity {
  fn from(user: &User) -> Self {
    Self {
      id:    user.id,
      name:  user.name.clone(),
      email: user.email.clone(),
      role:  user.role,
    }
  }
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// Access decision for a screen, given the current identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
  /// Render the requested screen.
  Allow,
  /// No session is held; go to the login screen.
  RedirectToLogin,
  /// A session is held but its role is not in the allow-list.
  RedirectToDefault,
}

/// Pure routing decision — no side effects.
///
/// `allowed = None` means any authenticated identity is admitted.
pub fn guard(
  identity: Option<&Identity>,
  allowed: Option<&[Role]>,
) -> GuardOutcome {
  let Some(identity) = identity else {
    return GuardOutcome::RedirectToLogin;
  };
  match allowed {
    Some(roles) if !roles.contains(&identity.role) => {
      GuardOutcome::RedirectToDefault
    }
    _ => GuardOutcome::Allow,
  }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

const TOKEN_ENTRY: &str = "access_token";
const IDENTITY_ENTRY: &str = "identity.json";

/// Durable storage for the session: two named entries in a state
/// directory, written together and cleared together.
#[derive(Debug)]
pub struct SessionStore {
  dir: PathBuf,
}

impl SessionStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn token_path(&self) -> PathBuf {
    self.dir.join(TOKEN_ENTRY)
  }

  fn identity_path(&self) -> PathBuf {
    self.dir.join(IDENTITY_ENTRY)
  }

  /// Read back a persisted session. Returns the pair only when both
  /// entries are present and the identity parses; anything partial or
  /// corrupt is deleted and reported as absent. Never errors.
  pub fn load(&self) -> Option<(Identity, String)> {
    let token = fs::read_to_string(self.token_path()).ok();
    let snapshot = fs::read_to_string(self.identity_path()).ok();

    match (snapshot, token) {
      (Some(snapshot), Some(token)) => {
        match serde_json::from_str::<Identity>(&snapshot) {
          Ok(identity) => Some((identity, token)),
          Err(e) => {
            tracing::warn!("discarding unparseable identity snapshot: {e}");
            self.clear();
            None
          }
        }
      }
      (None, None) => None,
      // Half a session is no session.
      _ => {
        tracing::warn!("discarding partial persisted session");
        self.clear();
        None
      }
    }
  }

  /// Persist both entries. The identity snapshot and the credential are
  /// only meaningful together, so a failure on either path aborts.
  pub fn save(&self, identity: &Identity, token: &str) -> io::Result<()> {
    fs::create_dir_all(&self.dir)?;
    let snapshot = serde_json::to_string(identity)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(self.identity_path(), snapshot)?;
    fs::write(self.token_path(), token)
  }

  /// Delete both entries. Idempotent; missing files are fine.
  pub fn clear(&self) {
    remove_if_present(&self.token_path());
    remove_if_present(&self.identity_path());
  }
}

fn remove_if_present(path: &Path) {
  if let Err(e) = fs::remove_file(path) {
    if e.kind() != io::ErrorKind::NotFound {
      tracing::warn!("failed to remove {}: {e}", path.display());
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct State {
  identity: Option<Identity>,
  token:    Option<String>,
}

/// The current session. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Session {
  state: Arc<RwLock<State>>,
  store: Arc<SessionStore>,
}

impl Session {
  pub fn new(store: SessionStore) -> Self {
    Self {
      state: Arc::new(RwLock::new(State::default())),
      store: Arc::new(store),
    }
  }

  // Lock poisoning cannot leave `State` half-written (all writes are
  // whole-field assignments), so a poisoned lock is recovered, not
  // propagated.
  fn read(&self) -> RwLockReadGuard<'_, State> {
    self.state.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, State> {
    self.state.write().unwrap_or_else(|e| e.into_inner())
  }

  /// Adopt a persisted session, if a valid one exists. Invoked once at
  /// process start; never fails.
  pub fn restore(&self) {
    if let Some((identity, token)) = self.store.load() {
      tracing::info!(user = %identity.email, "restored session");
      let mut state = self.write();
      state.identity = Some(identity);
      state.token = Some(token);
    }
  }

  /// Install a freshly authenticated identity, replacing any prior
  /// session, and persist it.
  pub fn establish(&self, identity: Identity, token: String) {
    if let Err(e) = self.store.save(&identity, &token) {
      // The in-memory session still works; it just won't survive restart.
      tracing::warn!("failed to persist session: {e}");
    }
    tracing::info!(user = %identity.email, role = %identity.role, "signed in");
    let mut state = self.write();
    state.identity = Some(identity);
    state.token = Some(token);
  }

  /// Clear the session, in memory and on disk. Idempotent.
  pub fn logout(&self) {
    tracing::info!("signed out");
    self.clear();
  }

  /// The API client's 401 path: same clearing semantics as [`logout`],
  /// logged as a forced expiry.
  ///
  /// [`logout`]: Session::logout
  pub fn expire(&self) {
    tracing::warn!("session expired by backend");
    self.clear();
  }

  fn clear(&self) {
    self.store.clear();
    let mut state = self.write();
    state.identity = None;
    state.token = None;
  }

  pub fn identity(&self) -> Option<Identity> {
    self.read().identity.clone()
  }

  pub fn token(&self) -> Option<String> {
    self.read().token.clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.read().identity.is_some()
  }

  /// Convenience over the pure [`guard`] for the current identity.
  pub fn guard(&self, allowed: Option<&[Role]>) -> GuardOutcome {
    guard(self.read().identity.as_ref(), allowed)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn identity(role: Role) -> Identity {
    Identity {
      id:    1,
      name:  "Alice".into(),
      email: "alice@example.com".into(),
      role,
    }
  }

  fn session_in(dir: &Path) -> Session {
    Session::new(SessionStore::new(dir))
  }

  // ── guard ─────────────────────────────────────────────────────────────────

  #[test]
  fn guard_without_identity_redirects_to_login() {
    assert_eq!(guard(None, None), GuardOutcome::RedirectToLogin);
    assert_eq!(
      guard(None, Some(&[Role::Admin])),
      GuardOutcome::RedirectToLogin
    );
  }

  #[test]
  fn guard_role_outside_allow_list_redirects_to_default() {
    let id = identity(Role::Student);
    assert_eq!(
      guard(Some(&id), Some(&[Role::Admin])),
      GuardOutcome::RedirectToDefault
    );
    assert_eq!(
      guard(Some(&id), Some(&[Role::Admin, Role::Teacher])),
      GuardOutcome::RedirectToDefault
    );
  }

  #[test]
  fn guard_allows_matching_role_or_open_allow_list() {
    let id = identity(Role::Teacher);
    assert_eq!(
      guard(Some(&id), Some(&[Role::Teacher])),
      GuardOutcome::Allow
    );
    assert_eq!(guard(Some(&id), None), GuardOutcome::Allow);
  }

  // ── persistence ───────────────────────────────────────────────────────────

  #[test]
  fn restore_round_trips_a_persisted_session() {
    let dir = tempfile::tempdir().unwrap();

    let first = session_in(dir.path());
    first.establish(identity(Role::Admin), "t1".into());

    let second = session_in(dir.path());
    second.restore();
    assert!(second.is_authenticated());
    assert_eq!(second.identity().unwrap().email, "alice@example.com");
    assert_eq!(second.token().as_deref(), Some("t1"));
  }

  #[test]
  fn restore_with_corrupt_identity_clears_both_entries() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(TOKEN_ENTRY), "t1").unwrap();
    fs::write(dir.path().join(IDENTITY_ENTRY), "{not json").unwrap();

    let session = session_in(dir.path());
    session.restore();

    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(!dir.path().join(TOKEN_ENTRY).exists());
    assert!(!dir.path().join(IDENTITY_ENTRY).exists());
  }

  #[test]
  fn restore_with_half_a_session_clears_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(TOKEN_ENTRY), "t1").unwrap();

    let session = session_in(dir.path());
    session.restore();

    assert!(!session.is_authenticated());
    assert!(!dir.path().join(TOKEN_ENTRY).exists());
  }

  #[test]
  fn logout_is_idempotent_and_empties_storage() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.establish(identity(Role::Student), "t1".into());

    session.logout();
    assert!(!session.is_authenticated());
    assert!(!dir.path().join(TOKEN_ENTRY).exists());

    // Already anonymous; must not panic or resurrect anything.
    session.logout();
    assert!(!session.is_authenticated());
  }

  #[test]
  fn establish_replaces_the_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.establish(identity(Role::Student), "t1".into());

    let mut second = identity(Role::Admin);
    second.email = "bob@example.com".into();
    session.establish(second, "t2".into());

    let current = session.identity().unwrap();
    assert_eq!(current.email, "bob@example.com");
    assert_eq!(session.token().as_deref(), Some("t2"));
  }
}
