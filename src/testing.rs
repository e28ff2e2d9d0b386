//! Mock implementations for testing
//!
//! These mocks enable testing the session store and chat engine without
//! real I/O, plus a small in-process backend for the HTTP transport.

use crate::api::{Endpoint, Transport, TransportError, User};
use crate::navigation::{Navigator, Route};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that returns queued responses in order
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<(Endpoint, Option<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response body
    pub fn queue_ok(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    /// Queue a failure
    pub fn queue_err(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<(Endpoint, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((endpoint, body));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network()))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        self.next_response(endpoint, body)
    }
}

// ============================================================================
// Delayed Mock Transport (for in-flight testing)
// ============================================================================

use std::time::Duration;
use tokio::sync::Notify;

/// Mock transport with a configurable delay
pub struct DelayedMockTransport {
    inner: MockTransport,
    delay: Duration,
    /// Notified when a call starts; the permit is kept if nobody waits yet
    pub request_started: Arc<Notify>,
}

impl DelayedMockTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockTransport::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_ok(&self, body: Value) {
        self.inner.queue_ok(body);
    }

    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl Transport for DelayedMockTransport {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Value, TransportError> {
        let response = self.inner.next_response(endpoint, body);
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        response
    }
}

// ============================================================================
// Recording Navigator
// ============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

// ============================================================================
// Fake Backend
// ============================================================================

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct BackendState {
    users: Mutex<Vec<(User, String)>>,
    sessions: Mutex<HashMap<String, i64>>,
    chat_plain_500: AtomicBool,
}

impl BackendState {
    fn start_session(&self, user: &User) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.lock().unwrap().insert(id.clone(), user.id);
        format!("session={id}; Path=/; HttpOnly")
    }

    fn session_id(headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        cookies
            .split(';')
            .map(str::trim)
            .find_map(|c| c.strip_prefix("session="))
            .map(str::to_string)
    }

    fn session_user(&self, headers: &HeaderMap) -> Option<User> {
        let session_id = Self::session_id(headers)?;
        let user_id = *self.sessions.lock().unwrap().get(&session_id)?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone())
    }
}

type Shared = Arc<BackendState>;

/// In-process HTTP service following the login/signup/logout/me/chat
/// contract, with cookie-based sessions
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    _server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(BackendState::default());
        let router = Router::new()
            .route("/login", post(login))
            .route("/signup", post(signup))
            .route("/logout", post(logout))
            .route("/me", get(me))
            .route("/chat", post(chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            state,
            _server: server,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_user(&self, username: &str, email: &str, password: &str) -> User {
        let mut users = self.state.users.lock().unwrap();
        let user = User {
            id: i64::try_from(users.len()).unwrap() + 1,
            username: username.to_string(),
            email: email.to_string(),
        };
        users.push((user.clone(), password.to_string()));
        user
    }

    /// Make `/chat` answer 500 with a non-JSON body
    pub fn fail_chat_with_plain_500(&self) {
        self.state.chat_plain_500.store(true, Ordering::SeqCst);
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "Please log in to access this resource.",
    )
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let (Some(username), Some(password)) = (body["username"].as_str(), body["password"].as_str())
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        );
    };

    let user = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|(user, stored)| user.username == username && stored == password)
        .map(|(user, _)| user.clone());
    let Some(user) = user else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid username or password");
    };

    let cookie = state.start_session(&user);
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged in successfully", "user": user })),
    )
        .into_response()
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    for field in ["username", "password", "email"] {
        if body[field].as_str().is_none() {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Missing required field: {field}"),
            );
        }
    }
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = {
        let mut users = state.users.lock().unwrap();
        if users.iter().any(|(user, _)| user.username == username) {
            return error_response(StatusCode::BAD_REQUEST, "Username already exists");
        }
        if users.iter().any(|(user, _)| user.email == email) {
            return error_response(StatusCode::BAD_REQUEST, "Email already exists");
        }
        let user = User {
            id: i64::try_from(users.len()).unwrap() + 1,
            username: username.to_string(),
            email: email.to_string(),
        };
        users.push((user.clone(), password.to_string()));
        user
    };

    let cookie = state.start_session(&user);
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "User created successfully", "user": user })),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if state.session_user(&headers).is_none() {
        return unauthorized();
    }
    if let Some(id) = BackendState::session_id(&headers) {
        state.sessions.lock().unwrap().remove(&id);
    }
    Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match state.session_user(&headers) {
        Some(user) => Json(user).into_response(),
        None => unauthorized(),
    }
}

async fn chat(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if state.session_user(&headers).is_none() {
        return unauthorized();
    }
    let Some(message) = body["message"].as_str() else {
        return error_response(StatusCode::BAD_REQUEST, "Message is required");
    };
    if state.chat_plain_500.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    Json(json!({ "response": format!("echo: {message}") })).into_response()
}
