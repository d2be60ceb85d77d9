//! Async HTTP client wrapping the rollcall JSON API.
//!
//! Every resource method is a thin wrapper with one shared contract,
//! [`ApiClient::handle_response`]: 2xx deserialises the payload, 401 clears
//! the session before failing, and any other status becomes a
//! [`Error::Request`] carrying the server's message.

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use rollcall_core::{
  Role,
  attendance::{
    AttendanceRecord, AttendanceSession, ImageProcessingOutcome,
    NewAttendanceRecord, NewAttendanceSession, StudentAttendanceSummary,
  },
  subject::{EnrolledStudent, Enrollment, NewSubject, Subject, SubjectPatch},
  user::{NewUser, User, UserPatch},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
  error::{Error, Result},
  session::{Identity, Session},
};

// ─── Wire helpers ────────────────────────────────────────────────────────────

/// Response of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
  pub access_token: String,
  pub token_type: String,
  pub user: User,
}

/// The backend's message-only responses (deletes, face registration).
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
  pub message: String,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  detail: Option<String>,
}

// ─── Query parameters ────────────────────────────────────────────────────────

/// Query parameters for `GET /users`.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
  pub skip:   Option<usize>,
  pub limit:  Option<usize>,
  pub role:   Option<Role>,
  pub search: Option<String>,
}

impl UserQuery {
  fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(skip) = self.skip {
      params.push(("skip", skip.to_string()));
    }
    if let Some(limit) = self.limit {
      params.push(("limit", limit.to_string()));
    }
    if let Some(role) = self.role {
      params.push(("role", role.as_str().to_string()));
    }
    if let Some(search) = &self.search {
      params.push(("search", search.clone()));
    }
    params
  }
}

/// Query parameters for `GET /subjects`.
#[derive(Debug, Clone, Default)]
pub struct SubjectQuery {
  pub skip:       Option<usize>,
  pub limit:      Option<usize>,
  pub teacher_id: Option<i64>,
  pub search:     Option<String>,
}

impl SubjectQuery {
  fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(skip) = self.skip {
      params.push(("skip", skip.to_string()));
    }
    if let Some(limit) = self.limit {
      params.push(("limit", limit.to_string()));
    }
    if let Some(teacher_id) = self.teacher_id {
      params.push(("teacher_id", teacher_id.to_string()));
    }
    if let Some(search) = &self.search {
      params.push(("search", search.clone()));
    }
    params
  }
}

/// Query parameters for `GET /attendance/sessions`.
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
  pub subject_id: Option<i64>,
  pub teacher_id: Option<i64>,
  pub start_date: Option<DateTime<Utc>>,
  pub end_date:   Option<DateTime<Utc>>,
}

impl SessionQuery {
  fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(subject_id) = self.subject_id {
      params.push(("subject_id", subject_id.to_string()));
    }
    if let Some(teacher_id) = self.teacher_id {
      params.push(("teacher_id", teacher_id.to_string()));
    }
    if let Some(start) = self.start_date {
      params.push(("start_date", start.to_rfc3339()));
    }
    if let Some(end) = self.end_date {
      params.push(("end_date", end.to_rfc3339()));
    }
    params
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the rollcall REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based and the
/// session is shared.
#[derive(Clone)]
pub struct ApiClient {
  http:     Client,
  base_url: String,
  session:  Session,
}

impl ApiClient {
  /// No request timeout is configured: latency is bounded by the backend,
  /// and a slow face-recognition pass can legitimately take a while.
  pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self> {
    let http = Client::builder().build()?;
    Ok(Self {
      http,
      base_url: base_url.into(),
      session,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Attach the bearer credential, when one is held. The credential is
  /// opaque: forwarded verbatim, never inspected.
  fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
    match self.session.token() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = self.authorize(req).send().await?;
    self.handle_response(resp).await
  }

  /// Decode a response without side effects: 2xx deserialises, 401 maps to
  /// [`Error::Authentication`], anything else to [`Error::Request`] with
  /// the server's `detail` message or an `HTTP <status>` fallback.
  async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();

    if status == StatusCode::UNAUTHORIZED {
      return Err(Error::Authentication);
    }

    if !status.is_success() {
      let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
      tracing::debug!(status = status.as_u16(), %message, "request failed");
      return Err(Error::Request {
        status: status.as_u16(),
        message,
      });
    }

    Ok(resp.json().await?)
  }

  /// The shared response contract for authorized calls. A rejected
  /// credential clears the session as a side effect — regardless of which
  /// endpoint triggered it — so the gate transitions to anonymous before
  /// the error reaches the caller.
  async fn handle_response<T: DeserializeOwned>(
    &self,
    resp: Response,
  ) -> Result<T> {
    let result = Self::decode(resp).await;
    if let Err(Error::Authentication) = &result {
      self.session.expire();
    }
    result
  }

  fn image_part(file_name: &str, bytes: Vec<u8>) -> Result<multipart::Part> {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    Ok(
      multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime.as_ref())?,
    )
  }

  // ── Authentication ────────────────────────────────────────────────────────

  /// `POST /auth/login`. On success the returned identity and credential
  /// are installed as the current session; on any failure — including a
  /// 401 for bad credentials — the prior session (if any) is left
  /// untouched, which is why this decodes without the forced-expiry path.
  pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
    let resp = self
      .http
      .post(self.url("/auth/login"))
      .json(&serde_json::json!({ "email": email, "password": password }))
      .send()
      .await?;

    let login: LoginResponse = Self::decode(resp).await?;
    let identity = Identity::from(&login.user);
    self.session.establish(identity.clone(), login.access_token);
    Ok(identity)
  }

  /// `GET /auth/me`
  pub async fn current_user(&self) -> Result<User> {
    self.send(self.http.get(self.url("/auth/me"))).await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `GET /users`
  pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>> {
    self
      .send(self.http.get(self.url("/users")).query(&query.params()))
      .await
  }

  /// `POST /users`
  pub async fn create_user(&self, user: &NewUser) -> Result<User> {
    self.send(self.http.post(self.url("/users")).json(user)).await
  }

  /// `PUT /users/:id`
  pub async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User> {
    self
      .send(self.http.put(self.url(&format!("/users/{id}"))).json(patch))
      .await
  }

  /// `DELETE /users/:id`
  pub async fn delete_user(&self, id: i64) -> Result<ApiMessage> {
    self
      .send(self.http.delete(self.url(&format!("/users/{id}"))))
      .await
  }

  /// `GET /users/teachers/list`
  pub async fn list_teachers(&self) -> Result<Vec<User>> {
    self.send(self.http.get(self.url("/users/teachers/list"))).await
  }

  /// `GET /users/students/list`
  pub async fn list_students(&self) -> Result<Vec<User>> {
    self.send(self.http.get(self.url("/users/students/list"))).await
  }

  /// `POST /students/:id/register-face` (multipart)
  ///
  /// Face registration follows the same response contract as everything
  /// else, so a 401 here also expires the session.
  pub async fn register_face(
    &self,
    student_id: i64,
    file_name: &str,
    bytes: Vec<u8>,
  ) -> Result<ApiMessage> {
    let form =
      multipart::Form::new().part("image", Self::image_part(file_name, bytes)?);
    self
      .send(
        self
          .http
          .post(self.url(&format!("/students/{student_id}/register-face")))
          .multipart(form),
      )
      .await
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  /// `GET /subjects`
  pub async fn list_subjects(
    &self,
    query: &SubjectQuery,
  ) -> Result<Vec<Subject>> {
    self
      .send(self.http.get(self.url("/subjects")).query(&query.params()))
      .await
  }

  /// `POST /subjects`
  pub async fn create_subject(&self, subject: &NewSubject) -> Result<Subject> {
    self
      .send(self.http.post(self.url("/subjects")).json(subject))
      .await
  }

  /// `PUT /subjects/:id`
  pub async fn update_subject(
    &self,
    id: i64,
    patch: &SubjectPatch,
  ) -> Result<Subject> {
    self
      .send(self.http.put(self.url(&format!("/subjects/{id}"))).json(patch))
      .await
  }

  /// `DELETE /subjects/:id`
  pub async fn delete_subject(&self, id: i64) -> Result<ApiMessage> {
    self
      .send(self.http.delete(self.url(&format!("/subjects/{id}"))))
      .await
  }

  /// `GET /subjects/:id/students`
  pub async fn subject_students(
    &self,
    subject_id: i64,
  ) -> Result<Vec<EnrolledStudent>> {
    self
      .send(
        self
          .http
          .get(self.url(&format!("/subjects/{subject_id}/students"))),
      )
      .await
  }

  /// `POST /subjects/:id/enroll`
  pub async fn enroll_student(
    &self,
    subject_id: i64,
    student_id: i64,
  ) -> Result<Enrollment> {
    self
      .send(
        self
          .http
          .post(self.url(&format!("/subjects/{subject_id}/enroll")))
          .json(&serde_json::json!({
            "student_id": student_id,
            "subject_id": subject_id,
          })),
      )
      .await
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  /// `POST /attendance/sessions`
  pub async fn create_attendance_session(
    &self,
    session: &NewAttendanceSession,
  ) -> Result<AttendanceSession> {
    self
      .send(self.http.post(self.url("/attendance/sessions")).json(session))
      .await
  }

  /// `POST /attendance/sessions/:id/upload-image` (multipart)
  pub async fn upload_attendance_image(
    &self,
    session_id: i64,
    file_name: &str,
    bytes: Vec<u8>,
  ) -> Result<ImageProcessingOutcome> {
    let form =
      multipart::Form::new().part("image", Self::image_part(file_name, bytes)?);
    self
      .send(
        self
          .http
          .post(
            self
              .url(&format!("/attendance/sessions/{session_id}/upload-image")),
          )
          .multipart(form),
      )
      .await
  }

  /// `POST /attendance/sessions/:id/records`
  pub async fn mark_attendance(
    &self,
    session_id: i64,
    record: &NewAttendanceRecord,
  ) -> Result<AttendanceRecord> {
    self
      .send(
        self
          .http
          .post(self.url(&format!("/attendance/sessions/{session_id}/records")))
          .json(record),
      )
      .await
  }

  /// `GET /attendance/sessions/:id/records`
  pub async fn session_records(
    &self,
    session_id: i64,
  ) -> Result<Vec<AttendanceRecord>> {
    self
      .send(
        self
          .http
          .get(self.url(&format!("/attendance/sessions/{session_id}/records"))),
      )
      .await
  }

  /// `GET /attendance/sessions`
  pub async fn list_attendance_sessions(
    &self,
    query: &SessionQuery,
  ) -> Result<Vec<AttendanceSession>> {
    self
      .send(
        self
          .http
          .get(self.url("/attendance/sessions"))
          .query(&query.params()),
      )
      .await
  }

  /// `GET /attendance/student/:id`
  pub async fn student_attendance(
    &self,
    student_id: i64,
  ) -> Result<StudentAttendanceSummary> {
    self
      .send(
        self
          .http
          .get(self.url(&format!("/attendance/student/{student_id}"))),
      )
      .await
  }
}
