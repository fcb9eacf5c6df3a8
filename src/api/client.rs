//! Authenticated API client for the Quiz Master backend.
//!
//! Every outbound request reads the bearer token from the injected session
//! store exactly once, before transmission. A 401 response triggers a
//! one-shot interception per request descriptor: the stored session is
//! cleared, the host's session-expired hook fires, and the `Unauthorized`
//! error still reaches the caller. Nothing is retried on the caller's
//! behalf.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::{session, SessionData, SessionState, SessionStore};
use crate::models::{
    Ack, Assignment, AssignmentPayload, AssignedQuiz, Chapter, ChapterPayload, DashboardStats,
    LoginCredentials, LoginResponse, PerformanceSummary, Question, QuestionPayload, Quiz,
    QuizPayload, QuizSubmission, RegisterPayload, ReportOptions, ReportPreview, ReportRequest,
    ReportStats, Score, Subject, SubjectPayload, SubmissionResult, User, UserPayload, UserProfile,
};

use super::error::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Query parameter key for cache busting on idempotent reads.
const CACHE_BUSTER_KEY: &str = "_";

/// Hook the host environment supplies to react to session expiry, e.g. by
/// navigating to its login screen. Fired at most once per request descriptor.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Immutable record of one outbound call. The id keys the once-only 401
/// interception guard; the descriptor itself is never mutated.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    id: u64,
    method: Method,
    path: String,
}

impl RequestDescriptor {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

// Process-wide cache-buster source. Values never repeat: each draw is at
// least one greater than the previous even within a single clock tick.
static CACHE_BUSTER: AtomicU64 = AtomicU64::new(0);

fn cache_buster_value() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut prev = CACHE_BUSTER.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match CACHE_BUSTER.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Append a cache-busting query parameter to a URL. Freshness only; the
/// backend ignores the parameter.
pub fn cache_bust(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, CACHE_BUSTER_KEY, cache_buster_value())
}

/// API client for the Quiz Master backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    on_session_expired: Option<SessionExpiredHook>,
    next_request_id: Arc<AtomicU64>,
    /// Ids of descriptors whose 401 has been intercepted. Entries stay for
    /// the client's lifetime so a descriptor remains suppressed on any later
    /// 401 carrying it; growth is one u64 per intercepted 401.
    intercepted: Arc<Mutex<HashSet<u64>>>,
}

impl ApiClient {
    /// Create a new API client against `base_url`, reading session state
    /// from `store`.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            on_session_expired: None,
            next_request_id: Arc::new(AtomicU64::new(1)),
            intercepted: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Register the hook fired when a 401 clears the session.
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    /// Current session, if the store holds a token.
    pub fn session(&self) -> Option<SessionData> {
        SessionData::load(&*self.store)
    }

    pub fn session_state(&self) -> SessionState {
        session::state(&*self.store)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Request plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn descriptor(&self, method: Method, path: &str) -> RequestDescriptor {
        RequestDescriptor {
            id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            method,
            path: path.to_string(),
        }
    }

    /// Build the Authorization header from the current token, if any.
    /// Anonymous requests carry no Authorization header at all.
    ///
    /// A stored token that cannot be placed in a header can never
    /// authenticate, so it is treated like any other invalid token: the
    /// session is cleared and the caller sees `Unauthorized`.
    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.store.get(crate::auth::keys::TOKEN) {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(e) => {
                    warn!(error = %e, "Stored token is not header-safe, clearing session");
                    session::clear(&*self.store);
                    return Err(ApiError::Unauthorized);
                }
            }
        }
        Ok(headers)
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(ApiError::NetworkUnavailable)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::NetworkUnavailable)?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                debug!(path = %descriptor.path, error = %e, "Failed to parse response body");
                ApiError::InvalidResponse(format!("{}: {}", descriptor.path, e))
            })
        } else {
            Err(self.handle_failure(descriptor, status, &text))
        }
    }

    /// Map a failed response onto the error taxonomy, applying the 401
    /// interception rule first.
    fn handle_failure(
        &self,
        descriptor: &RequestDescriptor,
        status: StatusCode,
        body: &str,
    ) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            self.intercept_unauthorized(descriptor);
            return ApiError::Unauthorized;
        }
        ApiError::from_status(status, body)
    }

    /// One-shot per descriptor: clear the stored session and notify the
    /// host. Repeated 401s on the same descriptor do nothing further, and
    /// clearing an already-cleared store is a no-op, so concurrent in-flight
    /// requests racing on expiry all land safely.
    fn intercept_unauthorized(&self, descriptor: &RequestDescriptor) {
        let newly_intercepted = {
            let mut guard = match self.intercepted.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.insert(descriptor.id)
        };

        if !newly_intercepted {
            debug!(path = %descriptor.path, "401 already intercepted for this request");
            return;
        }

        warn!(path = %descriptor.path, "Session expired, clearing stored session");
        session::clear(&*self.store);
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let descriptor = self.descriptor(Method::GET, path);
        let builder = self.client.get(self.url(path)).headers(self.auth_headers()?);
        self.send_request(&descriptor, builder).await
    }

    /// GET with a cache-busting query parameter, for reads that must bypass
    /// intermediate caches.
    pub(crate) async fn get_fresh<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let descriptor = self.descriptor(Method::GET, path);
        let builder = self
            .client
            .get(self.url(&cache_bust(path)))
            .headers(self.auth_headers()?);
        self.send_request(&descriptor, builder).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let descriptor = self.descriptor(Method::POST, path);
        let builder = self
            .client
            .post(self.url(path))
            .headers(self.auth_headers()?)
            .json(body);
        self.send_request(&descriptor, builder).await
    }

    /// POST with no body, used by the export job triggers.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let descriptor = self.descriptor(Method::POST, path);
        let builder = self.client.post(self.url(path)).headers(self.auth_headers()?);
        self.send_request(&descriptor, builder).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let descriptor = self.descriptor(Method::PUT, path);
        let builder = self
            .client
            .put(self.url(path))
            .headers(self.auth_headers()?)
            .json(body);
        self.send_request(&descriptor, builder).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Ack, ApiError> {
        let descriptor = self.descriptor(Method::DELETE, path);
        let builder = self
            .client
            .delete(self.url(path))
            .headers(self.auth_headers()?);

        let response = builder.send().await.map_err(ApiError::NetworkUnavailable)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::NetworkUnavailable)?;

        if status.is_success() {
            // Deletes may return an empty body
            if text.trim().is_empty() {
                Ok(Ack::default())
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    ApiError::InvalidResponse(format!("{}: {}", descriptor.path, e))
                })
            }
        } else {
            Err(self.handle_failure(&descriptor, status, &text))
        }
    }

    // ===== Auth =====

    /// Authenticate and persist the session (Anonymous -> Authenticated).
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<SessionData, ApiError> {
        let response: LoginResponse = self.post("/auth/login", credentials).await?;

        let data = SessionData {
            token: response.token,
            user_id: response.user_id,
            is_admin: response.is_admin,
            login_time: Utc::now(),
        };
        data.persist(&*self.store);
        debug!(user_id = data.user_id, is_admin = data.is_admin, "Login succeeded");
        Ok(data)
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<Ack, ApiError> {
        self.post("/auth/register", payload).await
    }

    /// Clear every persisted session key (Authenticated -> Anonymous).
    /// Always succeeds, regardless of prior state; no server call is made.
    pub fn logout(&self) -> bool {
        session::clear(&*self.store);
        true
    }

    // ===== User endpoints (cache-busted reads) =====

    pub async fn assigned_quizzes(&self) -> Result<Vec<AssignedQuiz>, ApiError> {
        self.get_fresh("/user/quizzes").await
    }

    pub async fn quiz_questions(&self, quiz_id: i64) -> Result<Vec<Question>, ApiError> {
        self.get_fresh(&format!("/user/quizzes/{}/questions", quiz_id)).await
    }

    pub async fn submit_quiz(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionResult, ApiError> {
        self.post("/user/quizzes/submit", submission).await
    }

    pub async fn user_scores(&self) -> Result<Vec<Score>, ApiError> {
        self.get_fresh("/user/scores").await
    }

    pub async fn user_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_fresh("/user/profile").await
    }

    pub async fn user_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get_fresh("/user/subjects").await
    }

    pub async fn user_chapters(&self, subject_id: Option<i64>) -> Result<Vec<Chapter>, ApiError> {
        let path = match subject_id {
            Some(id) => format!("/user/chapters?subject_id={}", id),
            None => "/user/chapters".to_string(),
        };
        self.get_fresh(&path).await
    }

    pub async fn dashboard_performance(&self) -> Result<PerformanceSummary, ApiError> {
        self.get_fresh("/user/dashboard/performance").await
    }

    // ===== Admin: subjects =====

    pub async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get("/admin/subjects").await
    }

    pub async fn create_subject(&self, payload: &SubjectPayload) -> Result<Subject, ApiError> {
        self.post("/admin/subjects", payload).await
    }

    pub async fn update_subject(
        &self,
        id: i64,
        payload: &SubjectPayload,
    ) -> Result<Subject, ApiError> {
        self.put(&format!("/admin/subjects/{}", id), payload).await
    }

    pub async fn delete_subject(&self, id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/subjects/{}", id)).await
    }

    // ===== Admin: chapters =====

    pub async fn chapters(&self) -> Result<Vec<Chapter>, ApiError> {
        self.get("/admin/chapters").await
    }

    pub async fn create_chapter(&self, payload: &ChapterPayload) -> Result<Chapter, ApiError> {
        self.post("/admin/chapters", payload).await
    }

    pub async fn update_chapter(
        &self,
        id: i64,
        payload: &ChapterPayload,
    ) -> Result<Chapter, ApiError> {
        self.put(&format!("/admin/chapters/{}", id), payload).await
    }

    pub async fn delete_chapter(&self, id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/chapters/{}", id)).await
    }

    // ===== Admin: quizzes =====

    pub async fn quizzes(&self) -> Result<Vec<Quiz>, ApiError> {
        self.get("/admin/quizzes").await
    }

    pub async fn create_quiz(&self, payload: &QuizPayload) -> Result<Quiz, ApiError> {
        self.post("/admin/quizzes", payload).await
    }

    pub async fn update_quiz(&self, id: i64, payload: &QuizPayload) -> Result<Quiz, ApiError> {
        self.put(&format!("/admin/quizzes/{}", id), payload).await
    }

    pub async fn delete_quiz(&self, id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/quizzes/{}", id)).await
    }

    // ===== Admin: questions =====

    /// All questions, or only those belonging to one quiz.
    pub async fn questions(&self, quiz_id: Option<i64>) -> Result<Vec<Question>, ApiError> {
        match quiz_id {
            Some(id) => self.get(&format!("/admin/quizzes/{}/questions", id)).await,
            None => self.get("/admin/questions").await,
        }
    }

    pub async fn create_question(&self, payload: &QuestionPayload) -> Result<Question, ApiError> {
        self.post("/admin/questions", payload).await
    }

    pub async fn update_question(
        &self,
        id: i64,
        payload: &QuestionPayload,
    ) -> Result<Question, ApiError> {
        self.put(&format!("/admin/questions/{}", id), payload).await
    }

    pub async fn delete_question(&self, id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/questions/{}", id)).await
    }

    // ===== Admin: users =====

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/admin/users").await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.post("/admin/users", payload).await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<User, ApiError> {
        self.put(&format!("/admin/users/{}", id), payload).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/users/{}", id)).await
    }

    // ===== Admin: assignments =====

    pub async fn assignments(&self) -> Result<Vec<Assignment>, ApiError> {
        self.get("/admin/assignments").await
    }

    pub async fn quiz_assignments(&self, quiz_id: i64) -> Result<Vec<Assignment>, ApiError> {
        self.get(&format!("/admin/quizzes/{}/assignments", quiz_id)).await
    }

    pub async fn assign_quiz(
        &self,
        quiz_id: i64,
        payload: &AssignmentPayload,
    ) -> Result<Ack, ApiError> {
        self.post(&format!("/admin/quizzes/{}/assign", quiz_id), payload).await
    }

    pub async fn remove_assignment(&self, quiz_id: i64, user_id: i64) -> Result<Ack, ApiError> {
        self.delete(&format!("/admin/quizzes/{}/assignments/{}", quiz_id, user_id))
            .await
    }

    // ===== Admin: dashboard and reports =====

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/stats").await
    }

    pub async fn report_options(&self) -> Result<ReportOptions, ApiError> {
        self.get("/admin/reports/monthly").await
    }

    pub async fn report_stats(&self) -> Result<ReportStats, ApiError> {
        self.get("/admin/reports/stats").await
    }

    pub async fn trigger_monthly_report(&self, request: &ReportRequest) -> Result<Ack, ApiError> {
        self.post("/admin/reports/monthly/trigger", request).await
    }

    pub async fn preview_monthly_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportPreview, ApiError> {
        self.post("/admin/reports/monthly/preview", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{keys, MemoryStore};
    use std::sync::atomic::AtomicUsize;

    fn client_with_store(store: Arc<MemoryStore>) -> ApiClient {
        ApiClient::new("http://localhost:5000", store).expect("build client")
    }

    #[test]
    fn test_cache_bust_separator() {
        let busted = cache_bust("/user/scores");
        assert!(busted.starts_with("/user/scores?_="));

        let busted = cache_bust("/user/chapters?subject_id=3");
        assert!(busted.starts_with("/user/chapters?subject_id=3&_="));
    }

    #[test]
    fn test_cache_bust_values_strictly_increase() {
        let mut previous = 0u64;
        for _ in 0..1000 {
            let value = cache_buster_value();
            assert!(value > previous, "cache buster must strictly increase");
            previous = value;
        }
    }

    #[test]
    fn test_auth_header_matches_stored_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc123");
        let client = client_with_store(store);

        let headers = client.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc123")
        );
    }

    #[test]
    fn test_header_unsafe_token_is_unauthorized_and_clears_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc\n123");
        store.set(keys::USER_ID, "42");
        let client = client_with_store(Arc::clone(&store));

        let err = client.auth_headers().expect_err("token with a newline cannot be sent");
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(store.get(keys::TOKEN), None);
        assert_eq!(store.get(keys::USER_ID), None);
    }

    #[test]
    fn test_no_auth_header_without_token() {
        let store = Arc::new(MemoryStore::new());
        let client = client_with_store(store);

        let headers = client.auth_headers().expect("headers");
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_401_interception_clears_session_and_fires_hook_once() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc123");
        store.set(keys::USER_ID, "42");
        store.set(keys::IS_ADMIN, "false");
        store.set(keys::LOGIN_TIME, "2025-01-01T00:00:00Z");

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let client = client_with_store(Arc::clone(&store)).on_session_expired(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        let descriptor = client.descriptor(Method::GET, "/user/scores");
        let err = client.handle_failure(&descriptor, StatusCode::UNAUTHORIZED, "");

        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        for key in keys::ALL {
            assert_eq!(store.get(key), None, "key {} should be cleared", key);
        }

        // Second 401 on the same descriptor: no further side effects
        let err = client.handle_failure(&descriptor, StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_descriptors_intercept_independently() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc123");

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let client = client_with_store(Arc::clone(&store)).on_session_expired(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Two requests in flight when the session expires: both intercept,
        // the second clear is a no-op on an already-empty store.
        let first = client.descriptor(Method::GET, "/user/scores");
        let second = client.descriptor(Method::GET, "/user/profile");
        client.handle_failure(&first, StatusCode::UNAUTHORIZED, "");
        client.handle_failure(&second, StatusCode::UNAUTHORIZED, "");

        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(store.get(keys::TOKEN), None);
    }

    #[test]
    fn test_non_401_failures_leave_session_alone() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc123");
        let client = client_with_store(Arc::clone(&store));

        let descriptor = client.descriptor(Method::GET, "/admin/stats");
        let err = client.handle_failure(&descriptor, StatusCode::FORBIDDEN, "admins only");

        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(store.get(keys::TOKEN), Some("abc123".to_string()));
    }

    #[test]
    fn test_logout_clears_all_keys_from_any_state() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::TOKEN, "abc123");
        store.set(keys::USER_ID, "42");
        store.set(keys::IS_ADMIN, "true");
        store.set(keys::LOGIN_TIME, "2025-01-01T00:00:00Z");
        let client = client_with_store(Arc::clone(&store));

        assert!(client.logout());
        for key in keys::ALL {
            assert_eq!(store.get(key), None);
        }

        // Logout while already Anonymous still reports success
        assert!(client.logout());
        assert_eq!(client.session_state(), SessionState::Anonymous);
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new("http://localhost:5000/", store).expect("build client");
        assert_eq!(client.url("/user/scores"), "http://localhost:5000/user/scores");
    }
}
