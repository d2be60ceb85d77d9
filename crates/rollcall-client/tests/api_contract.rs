//! Integration tests for the client's response contract, driven against a
//! stub axum backend on an ephemeral port.

use axum::{
  Json, Router,
  extract::{Multipart, Path},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  routing::{delete, get, post},
};
use rollcall_client::{
  ApiClient, Error, Session, SessionStore, SubjectQuery, UserQuery,
};
use rollcall_core::{Role, subject::NewSubject};
use serde_json::{Value, json};
use tempfile::TempDir;

// ─── Harness ─────────────────────────────────────────────────────────────────

async fn serve(app: Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind ephemeral port");
  let addr = listener.local_addr().expect("local addr");
  tokio::spawn(async move {
    axum::serve(listener, app).await.expect("stub backend");
  });
  format!("http://{addr}")
}

fn client_against(base: &str, dir: &TempDir) -> (ApiClient, Session) {
  let session = Session::new(SessionStore::new(dir.path()));
  let client =
    ApiClient::new(base, session.clone()).expect("build http client");
  (client, session)
}

fn signed_in(session: &Session, token: &str) {
  session.establish(
    rollcall_client::Identity {
      id:    1,
      name:  "A".into(),
      email: "a@x.com".into(),
      role:  Role::Admin,
    },
    token.into(),
  );
}

fn admin_user_json() -> Value {
  json!({
    "id": 1,
    "name": "A",
    "email": "a@x.com",
    "role": "admin",
    "is_active": true,
    "created_at": "2025-09-01T08:00:00Z",
    "updated_at": "2025-09-01T08:00:00Z",
  })
}

fn unauthorized() -> (StatusCode, Json<Value>) {
  (
    StatusCode::UNAUTHORIZED,
    Json(json!({ "detail": "Could not validate credentials" })),
  )
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_credential_and_identity() {
  let app = Router::new().route(
    "/api/auth/login",
    post(|| async {
      Json(json!({
        "access_token": "t1",
        "token_type": "bearer",
        "user": admin_user_json(),
      }))
    }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);

  let identity = client.login("a@x.com", "password").await.unwrap();

  assert_eq!(identity.id, 1);
  assert_eq!(identity.role, Role::Admin);
  assert!(session.is_authenticated());
  assert_eq!(session.token().as_deref(), Some("t1"));
  assert_eq!(session.identity().unwrap().email, "a@x.com");

  // Both entries persisted, so a fresh process can restore.
  let restored = Session::new(SessionStore::new(dir.path()));
  restored.restore();
  assert!(restored.is_authenticated());
}

#[tokio::test]
async fn failed_login_leaves_prior_session_untouched() {
  let app = Router::new().route(
    "/api/auth/login",
    post(|| async { unauthorized() }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t-old");

  let err = client.login("a@x.com", "wrong").await.unwrap_err();

  assert!(err.is_authentication());
  assert!(session.is_authenticated());
  assert_eq!(session.token().as_deref(), Some("t-old"));
}

// ─── 401 contract ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_response_clears_session_from_any_endpoint() {
  let app = Router::new()
    .route("/api/subjects", get(|| async { unauthorized() }))
    .route("/api/users", get(|| async { unauthorized() }));
  let base = serve(app).await;

  // Same outcome whichever endpoint trips first.
  for call in ["subjects", "users"] {
    let dir = TempDir::new().unwrap();
    let (client, session) = client_against(&base, &dir);
    signed_in(&session, "t-stale");

    let err = match call {
      "subjects" => client
        .list_subjects(&SubjectQuery::default())
        .await
        .unwrap_err(),
      _ => client.list_users(&UserQuery::default()).await.unwrap_err(),
    };

    assert!(err.is_authentication(), "{call}: expected auth error");
    assert!(!session.is_authenticated(), "{call}: session not cleared");
    assert!(session.token().is_none());
    let restored = Session::new(SessionStore::new(dir.path()));
    restored.restore();
    assert!(!restored.is_authenticated(), "{call}: storage not cleared");
  }
}

// ─── Error messages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn request_error_carries_server_detail() {
  let app = Router::new().route(
    "/api/users/{id}",
    delete(|| async {
      (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "Not enough permissions" })),
      )
    }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t1");

  match client.delete_user(7).await.unwrap_err() {
    Error::Request { status, message } => {
      assert_eq!(status, 403);
      assert_eq!(message, "Not enough permissions");
    }
    other => panic!("expected Request error, got {other:?}"),
  }
  // Non-401 failures must not touch the session.
  assert!(session.is_authenticated());
}

#[tokio::test]
async fn request_error_falls_back_to_http_status() {
  let app = Router::new().route(
    "/api/subjects",
    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t1");

  match client
    .list_subjects(&SubjectQuery::default())
    .await
    .unwrap_err()
  {
    Error::Request { status, message } => {
      assert_eq!(status, 500);
      assert_eq!(message, "HTTP 500");
    }
    other => panic!("expected Request error, got {other:?}"),
  }
}

// ─── Bearer attachment ───────────────────────────────────────────────────────

#[tokio::test]
async fn bearer_credential_is_forwarded_verbatim() {
  let app = Router::new().route(
    "/api/auth/me",
    get(|headers: HeaderMap| async move {
      let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
      if auth == "Bearer t9" {
        Json(admin_user_json()).into_response()
      } else {
        unauthorized().into_response()
      }
    }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t9");

  let me = client.current_user().await.unwrap();
  assert_eq!(me.id, 1);
}

// ─── Round-trip ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_subject_renders_with_server_assigned_id() {
  let app = Router::new().route(
    "/api/subjects",
    post(|Json(body): Json<Value>| async move {
      Json(json!({
        "id": 42,
        "name": body["name"],
        "code": body["code"],
        "description": body["description"],
        "teacher_id": null,
        "is_active": true,
        "created_at": "2025-09-01T08:00:00Z",
        "updated_at": "2025-09-01T08:00:00Z",
      }))
    }),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t1");

  let created = client
    .create_subject(&NewSubject {
      name: "Databases".into(),
      code: "CS305".into(),
      description: Some("Storage and querying".into()),
      teacher_id: None,
    })
    .await
    .unwrap();

  assert_eq!(created.id, 42);
  assert_eq!(created.name, "Databases");
}

// ─── Multipart uploads ───────────────────────────────────────────────────────

#[tokio::test]
async fn image_upload_sends_a_single_image_part() {
  let app = Router::new().route(
    "/api/attendance/sessions/{id}/upload-image",
    post(
      |Path(id): Path<i64>, mut multipart: Multipart| async move {
        let field = multipart
          .next_field()
          .await
          .expect("read multipart")
          .expect("one field");
        assert_eq!(field.name(), Some("image"));
        assert_eq!(field.file_name(), Some("class.jpg"));
        let bytes = field.bytes().await.expect("field bytes");
        assert!(!bytes.is_empty());

        Json(json!({
          "session_id": id,
          "detected_students": [{
            "student_id": 3,
            "name": "S",
            "email": "s@x.com",
            "detected": true,
            "confidence": 0.93,
          }],
          "total_detected": 1,
          "processing_status": "completed",
        }))
      },
    ),
  );
  let base = serve(app).await;
  let dir = TempDir::new().unwrap();
  let (client, session) = client_against(&base, &dir);
  signed_in(&session, "t1");

  let outcome = client
    .upload_attendance_image(11, "class.jpg", vec![0xff, 0xd8, 0xff])
    .await
    .unwrap();

  assert_eq!(outcome.session_id, 11);
  assert_eq!(outcome.total_detected, 1);
  assert!(outcome.detected_students[0].detected);
}
