//! Integration tests for the LuxTime client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luxtime-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Login, register, restore, logout and stale responses
//! - `api_errors` - Error-body normalization and transport failures over HTTP
//! - `resources` - Catalog, notification and admin endpoints
//! - `persistence` - Token and favorites surviving restarts in a file store
//!
//! # Mock API
//!
//! [`MockApi`] serves an in-memory imitation of the marketplace API on an
//! ephemeral port. It records every request (path, query, `Authorization`,
//! `X-Request-Id`) and the JSON bodies of write endpoints so tests can assert
//! on exactly what the client sent.

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use luxtime_client::{ApiClient, MemoryStore, Session, SharedStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use url::Url;

// =============================================================================
// Recorded traffic
// =============================================================================

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string, `None` when the URL had no `?`.
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
}

/// Holds responses of one endpoint until released.
///
/// The request is recorded when it arrives; only the response waits.
pub struct ResponseGate {
    arrived: Notify,
    release: Semaphore,
}

impl ResponseGate {
    fn new() -> Self {
        Self {
            arrived: Notify::new(),
            release: Semaphore::new(0),
        }
    }

    /// Wait until a request is being held.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Let one held response go.
    pub fn release(&self) {
        self.release.add_permits(1);
    }
}

type GateSlot = Arc<Mutex<Option<Arc<ResponseGate>>>>;

/// Park the current request on the gate in `slot`, if one is installed.
async fn pass_gate(slot: &GateSlot) {
    let gate = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
    if let Some(gate) = gate {
        gate.arrived.notify_one();
        if let Ok(permit) = gate.release.acquire().await {
            permit.forget();
        }
    }
}

fn install_gate(slot: &GateSlot) -> Arc<ResponseGate> {
    let gate = Arc::new(ResponseGate::new());
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate.clone());
    gate
}

// =============================================================================
// Server state
// =============================================================================

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    full_name: String,
    email: String,
    password: String,
    role: String,
    is_active: bool,
}

impl MockUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "full_name": self.full_name,
            "email": self.email,
            "role": self.role,
            "stellar_public_key": null,
            "balance_brl": 1500.5,
            "balance_xlm": 12.25,
            "is_active": self.is_active,
            "created_at": "2025-02-10T09:15:00.000123"
        })
    }
}

struct Data {
    next_user_id: i64,
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    issued_tokens: u64,
    watches: Vec<Value>,
    next_watch_id: i64,
    favorites: BTreeSet<i64>,
    notifications: Vec<Value>,
    requests: Vec<RecordedRequest>,
    bodies: Vec<(String, Value)>,
    login_override: Option<(StatusCode, Value)>,
}

impl Data {
    fn seeded() -> Self {
        Self {
            next_user_id: 1,
            users: Vec::new(),
            tokens: HashMap::new(),
            issued_tokens: 0,
            watches: vec![
                json!({
                    "id": 1,
                    "brand": "Rolex",
                    "model": "Submariner",
                    "reference": "126610LN",
                    "year": 2022,
                    "condition": "seminovo",
                    "price": 89_900.0,
                    "images": ["https://cdn.luxtime.com.br/w/1.jpg"],
                    "store_id": 1,
                    "store_name": "Casa Suíça",
                    "is_active": true,
                    "is_sold": false,
                    "created_at": "2025-01-05T10:00:00"
                }),
                json!({
                    "id": 2,
                    "brand": "Omega",
                    "model": "Speedmaster",
                    "condition": "usado",
                    "price_brl": 42_000.0,
                    "is_active": true,
                    "is_sold": false
                }),
                json!({
                    "id": 3,
                    "brand": "Patek Philippe",
                    "model": "Nautilus",
                    "condition": "novo",
                    "price": 1_250_000.0,
                    "is_active": true,
                    "is_sold": true
                }),
            ],
            next_watch_id: 4,
            favorites: BTreeSet::new(),
            notifications: vec![
                json!({"id": 1, "user_id": 1, "title": "Compra confirmada", "message": "Seu Rolex está a caminho", "type": "success", "read": false, "created_at": "2025-03-01T12:00:00"}),
                json!({"id": 2, "user_id": 1, "title": "Avaliação", "message": "Avaliação concluída", "type": "info", "read": true, "created_at": "2025-03-02T08:30:00Z"}),
                json!({"id": 3, "user_id": 1, "title": "Promoção", "message": "Frete grátis", "type": "promotion", "read": false}),
            ],
            requests: Vec::new(),
            bodies: Vec::new(),
            login_override: None,
        }
    }

    fn add_user(&mut self, full_name: &str, email: &str, password: &str, role: &str) -> MockUser {
        let user = MockUser {
            id: self.next_user_id,
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
            is_active: true,
        };
        self.next_user_id += 1;
        self.users.push(user.clone());
        user
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        self.issued_tokens += 1;
        let token = format!("token-{user_id}-{}", self.issued_tokens);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn watch(&self, id: i64) -> Option<&Value> {
        self.watches
            .iter()
            .find(|w| w.get("id").and_then(Value::as_i64) == Some(id))
    }
}

#[derive(Clone)]
struct MockState {
    data: Arc<Mutex<Data>>,
    profile_gate: GateSlot,
    login_gate: GateSlot,
}

impl MockState {
    fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Data::seeded())),
            profile_gate: Arc::new(Mutex::new(None)),
            login_gate: Arc::new(Mutex::new(None)),
        }
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<MockUser, Response> {
        let token = header_str(headers, "authorization")
            .and_then(|value| value.strip_prefix("Bearer ").map(str::to_string));
        let data = self.data();
        token
            .and_then(|token| data.tokens.get(&token).copied())
            .and_then(|id| data.users.iter().find(|u| u.id == id).cloned())
            .ok_or_else(|| {
                error(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Could not validate credentials"}),
                )
            })
    }

    fn require_admin(&self, headers: &HeaderMap) -> Result<MockUser, Response> {
        let user = self.authenticate(headers)?;
        if user.role == "admin" {
            Ok(user)
        } else {
            Err(error(
                StatusCode::FORBIDDEN,
                json!({"detail": "Not enough permissions"}),
            ))
        }
    }

    fn record_body(&self, path: &str, body: Value) {
        self.data().bodies.push((path.to_string(), body));
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

// =============================================================================
// Router
// =============================================================================

fn router(state: MockState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/profile", get(profile))
        .route("/auth/balance", get(balance))
        .route("/watches", post(create_watch))
        .route("/watches/marketplace", get(marketplace))
        .route("/watches/favorites", get(server_favorites))
        .route("/watches/{id}", get(watch))
        .route("/watches/{id}/purchase", post(purchase))
        .route("/watches/{id}/favorite", post(toggle_favorite))
        .route("/notifications", get(notifications))
        .route("/notifications/mark-all-read", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_read))
        .route("/notifications/{id}", axum::routing::delete(delete_notification))
        .route("/admin/users", get(admin_users))
        .route("/admin/users/{id}/status", put(admin_update))
        .route("/admin/stores", get(admin_stores))
        .route("/admin/stores/{id}/status", put(admin_update))
        .route("/admin/evaluations", get(admin_evaluations))
        .route("/admin/evaluations/{id}/assign", put(admin_update))
        .route("/admin/evaluations/{id}/status", put(admin_update))
        .route("/admin/evaluators", get(admin_evaluators).post(create_evaluator))
        .route("/admin/evaluators/available", get(available_evaluators))
        .route("/admin/evaluators/{id}/status", put(admin_update))
        .route("/admin/dashboard/stats", get(dashboard_stats))
        .route("/admin/dashboard/recent-activity", get(recent_activity))
        .route("/errors/{kind}", get(error_fixture))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: header_str(headers, "authorization"),
        request_id: header_str(headers, "x-request-id"),
        content_type: header_str(headers, "content-type"),
    };
    state.data().requests.push(recorded);
    next.run(request).await
}

// -----------------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<MockState>, Form(form): Form<LoginForm>) -> Response {
    pass_gate(&state.login_gate).await;

    let mut data = state.data();
    if let Some((status, body)) = data.login_override.clone() {
        return error(status, body);
    }

    let Some(user_id) = data
        .users
        .iter()
        .find(|u| u.email == form.username && u.password == form.password)
        .map(|u| u.id)
    else {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Invalid credentials"}),
        );
    };

    let token = data.issue_token(user_id);
    Json(json!({"access_token": token, "token_type": "bearer"})).into_response()
}

async fn register(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.record_body("/auth/register", body.clone());
    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);

    let (Some(full_name), Some(email), Some(password)) =
        (field("full_name"), field("email"), field("password"))
    else {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [{"loc": ["body", "email"], "msg": "field required", "type": "value_error.missing"}]}),
        );
    };
    let role = field("role").unwrap_or_else(|| "user".to_string());

    let mut data = state.data();
    if data.users.iter().any(|u| u.email == email) {
        return error(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Email already registered"}),
        );
    }
    let user = data.add_user(&full_name, &email, &password, &role);
    (StatusCode::CREATED, Json(user.to_json())).into_response()
}

async fn profile(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    pass_gate(&state.profile_gate).await;

    Json(user.to_json()).into_response()
}

async fn balance(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match state.authenticate(&headers) {
        Ok(_) => Json(json!({"balance_brl": 1500.5, "balance_xlm": 12.25})).into_response(),
        Err(response) => response,
    }
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

async fn marketplace(State(state): State<MockState>) -> Json<Value> {
    let data = state.data();
    let available: Vec<Value> = data
        .watches
        .iter()
        .filter(|w| w.get("is_sold") != Some(&Value::Bool(true)))
        .cloned()
        .collect();
    Json(Value::Array(available))
}

async fn watch(State(state): State<MockState>, Path(id): Path<i64>) -> Response {
    state.data().watch(id).cloned().map_or_else(
        || error(StatusCode::NOT_FOUND, json!({"detail": "Watch not found"})),
        |w| Json(w).into_response(),
    )
}

async fn create_watch(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "store" && user.role != "admin" {
        return error(
            StatusCode::FORBIDDEN,
            json!({"detail": "Only stores can list watches"}),
        );
    }
    state.record_body("/watches", body.clone());

    let mut data = state.data();
    let mut created = body;
    if let Value::Object(fields) = &mut created {
        fields.insert("id".to_string(), json!(data.next_watch_id));
        fields.insert("is_active".to_string(), json!(true));
        fields.insert("is_sold".to_string(), json!(false));
        fields.insert("current_owner_user_id".to_string(), json!(user.id));
    }
    data.next_watch_id += 1;
    data.watches.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn purchase(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let user = match state.authenticate(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state.record_body(&format!("/watches/{id}/purchase"), body);

    let mut data = state.data();
    let Some(watch) = data
        .watches
        .iter_mut()
        .find(|w| w.get("id").and_then(Value::as_i64) == Some(id))
    else {
        return error(StatusCode::NOT_FOUND, json!({"detail": "Watch not found"}));
    };
    if watch.get("is_sold") == Some(&Value::Bool(true)) {
        return error(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Watch already sold"}),
        );
    }
    let amount = watch
        .get("price")
        .or_else(|| watch.get("price_brl"))
        .cloned()
        .unwrap_or(Value::Null);
    if let Value::Object(fields) = watch {
        fields.insert("is_sold".to_string(), json!(true));
    }

    Json(json!({
        "id": 100 + id,
        "buyer_user_id": user.id,
        "watch_id": id,
        "amount": amount,
        "payment_method": "brl",
        "status": "completed",
        "created_at": "2025-03-01T12:00:00"
    }))
    .into_response()
}

async fn toggle_favorite(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.authenticate(&headers) {
        return response;
    }
    let mut data = state.data();
    let is_favorite = if data.favorites.remove(&id) {
        false
    } else {
        data.favorites.insert(id);
        true
    };
    let message = if is_favorite {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    Json(json!({"is_favorite": is_favorite, "message": message})).into_response()
}

async fn server_favorites(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authenticate(&headers) {
        return response;
    }
    let data = state.data();
    let favorites: Vec<Value> = data
        .favorites
        .iter()
        .filter_map(|id| data.watch(*id).cloned())
        .collect();
    Json(Value::Array(favorites)).into_response()
}

// -----------------------------------------------------------------------------
// Notifications
// -----------------------------------------------------------------------------

async fn notifications(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match state.authenticate(&headers) {
        Ok(_) => Json(Value::Array(state.data().notifications.clone())).into_response(),
        Err(response) => response,
    }
}

async fn mark_read(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.authenticate(&headers) {
        return response;
    }
    let mut data = state.data();
    let Some(notification) = data
        .notifications
        .iter_mut()
        .find(|n| n.get("id").and_then(Value::as_i64) == Some(id))
    else {
        return error(
            StatusCode::NOT_FOUND,
            json!({"detail": "Notification not found"}),
        );
    };
    if let Value::Object(fields) = notification {
        fields.insert("read".to_string(), json!(true));
    }
    Json(json!({"message": "Notification marked as read"})).into_response()
}

async fn mark_all_read(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.authenticate(&headers) {
        return response;
    }
    for notification in &mut state.data().notifications {
        if let Value::Object(fields) = notification {
            fields.insert("read".to_string(), json!(true));
        }
    }
    Json(json!({"message": "All notifications marked as read"})).into_response()
}

async fn delete_notification(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.authenticate(&headers) {
        return response;
    }
    state
        .data()
        .notifications
        .retain(|n| n.get("id").and_then(Value::as_i64) != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

// -----------------------------------------------------------------------------
// Admin
// -----------------------------------------------------------------------------

async fn admin_users(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    let users: Vec<Value> = state
        .data()
        .users
        .iter()
        .map(|u| {
            let mut row = u.to_json();
            if let Value::Object(fields) = &mut row {
                fields.insert("last_login".to_string(), json!("2025-03-03T18:00:00"));
                fields.insert("total_purchases".to_string(), json!(2));
            }
            row
        })
        .collect();
    Json(Value::Array(users)).into_response()
}

/// Shared handler for the `PUT .../status` and `.../assign` endpoints.
async fn admin_update(
    State(state): State<MockState>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    state.record_body(uri.path(), body);
    Json(json!({"message": "Updated"})).into_response()
}

async fn admin_stores(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!([{
        "id": 1,
        "name": "Casa Suíça",
        "owner_id": 2,
        "owner_name": "Joana Prado",
        "status": "pending",
        "created_at": "2025-01-01T00:00:00",
        "total_watches": 14,
        "total_sales": 3,
        "average_rating": 4.8
    }]))
    .into_response()
}

async fn admin_evaluations(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!([{
        "id": 8,
        "watch_id": 1,
        "watch_brand": "Rolex",
        "watch_model": "Submariner",
        "status": "in_progress",
        "priority": "high",
        "evaluator_id": 2,
        "evaluator_name": "Carlos Mendes",
        "estimated_value": 90000.0,
        "created_at": "2025-02-20T14:00:00"
    }]))
    .into_response()
}

async fn admin_evaluators(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!([{
        "id": 2,
        "user_id": 5,
        "full_name": "Carlos Mendes",
        "email": "carlos@luxtime.com.br",
        "specialties": ["Rolex", "Omega"],
        "years_experience": 12,
        "certification_level": "master",
        "is_active": true,
        "total_evaluations": 40,
        "completed_evaluations": 38,
        "pending_evaluations": 2
    }]))
    .into_response()
}

async fn available_evaluators(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!([{"id": 2, "name": "Carlos Mendes"}])).into_response()
}

async fn create_evaluator(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    state.record_body("/admin/evaluators", body.clone());
    let mut created = json!({
        "id": 9,
        "full_name": "New Evaluator",
        "is_active": true
    });
    if let (Value::Object(out), Value::Object(input)) = (&mut created, body) {
        out.extend(input);
    }
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn dashboard_stats(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!({
        "users": {"total": 120, "active": 110, "stores": 8, "evaluators": 4},
        "watches": {"total": 64, "approved": 50, "pending": 10, "rejected": 4},
        "evaluations": {"total": 30, "pending": 5, "completed": 20, "approved": 18},
        "financial": {"total_transactions": 22, "total_volume": 1_980_000.5, "pending_payments": 1}
    }))
    .into_response()
}

async fn recent_activity(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_admin(&headers) {
        return response;
    }
    Json(json!([
        {"id": "a1", "type": "user_registration", "description": "Ana Lima signed up", "timestamp": "2025-03-03T10:00:00", "status": "success"},
        {"id": "a2", "type": "watch_sale", "description": "Rolex Submariner sold", "timestamp": "2025-03-03T11:30:00Z"}
    ]))
    .into_response()
}

// -----------------------------------------------------------------------------
// Error fixtures
// -----------------------------------------------------------------------------

async fn error_fixture(Path(kind): Path<String>) -> Response {
    match kind.as_str() {
        "string" => error(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Watch not available"}),
        ),
        "list" => error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [
                {"loc": ["body", "price"], "msg": "ensure this value is greater than 0"},
                {"loc": ["body", "year"], "msg": "second error"}
            ]}),
        ),
        "list-message" => error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [{"message": "year is out of range"}]}),
        ),
        "list-empty" => error(StatusCode::UNPROCESSABLE_ENTITY, json!({"detail": []})),
        "object" => error(
            StatusCode::CONFLICT,
            json!({"detail": {"message": "Store not approved"}}),
        ),
        "message" => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"message": "Internal failure"}),
        ),
        "html" => (
            StatusCode::BAD_GATEWAY,
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Bad Gateway</body></html>",
        )
            .into_response(),
        "empty" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "ok-empty" => StatusCode::NO_CONTENT.into_response(),
        "ok-garbage" => (StatusCode::OK, "not json").into_response(),
        _ => error(StatusCode::NOT_FOUND, json!({"detail": "Not Found"})),
    }
}

// =============================================================================
// Handle
// =============================================================================

/// A running mock API server. Stops when dropped.
pub struct MockApi {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start a server on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = MockState::new();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock API listener");
        let addr = listener.local_addr().expect("mock API address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock API");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL host.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock API URL")
    }

    /// A client for this server over `storage`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self, storage: SharedStore) -> ApiClient {
        ApiClient::with_base_url(self.url(), storage).expect("build API client")
    }

    /// A fresh session over in-memory storage, plus that storage.
    #[must_use]
    pub fn session(&self) -> (Session, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (Session::new(self.client(storage.clone())), storage)
    }

    /// Create an account directly on the server. Returns its id.
    pub fn add_user(&self, full_name: &str, email: &str, password: &str, role: &str) -> i64 {
        self.state
            .data()
            .add_user(full_name, email, password, role)
            .id
    }

    /// Issue a valid token for an existing account, as a previous login would.
    ///
    /// # Panics
    ///
    /// Panics if no account has that email.
    #[must_use]
    pub fn token_for(&self, email: &str) -> String {
        let mut data = self.state.data();
        let id = data
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .expect("unknown mock user");
        data.issue_token(id)
    }

    /// Accept `token` as a bearer token for the account with `email`.
    ///
    /// # Panics
    ///
    /// Panics if no account has that email.
    pub fn grant_token(&self, email: &str, token: &str) {
        let mut data = self.state.data();
        let id = data
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .expect("unknown mock user");
        data.tokens.insert(token.to_string(), id);
    }

    /// Make every login answer with `status` and `body`.
    pub fn set_login_response(&self, status: StatusCode, body: Value) {
        self.state.data().login_override = Some((status, body));
    }

    /// Hold all following profile responses until released through the gate.
    #[must_use]
    pub fn hold_profile(&self) -> Arc<ResponseGate> {
        install_gate(&self.state.profile_gate)
    }

    /// Hold all following login responses until released through the gate.
    #[must_use]
    pub fn hold_login(&self) -> Arc<ResponseGate> {
        install_gate(&self.state.login_gate)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.data().requests.clone()
    }

    /// Requests received for `path` (without query).
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// JSON bodies received by write endpoints at `path`.
    #[must_use]
    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.state
            .data()
            .bodies
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Server-side favorite flags.
    #[must_use]
    pub fn server_favorites(&self) -> Vec<i64> {
        self.state.data().favorites.iter().copied().collect()
    }

    /// Whether notification `id` still exists and is read.
    #[must_use]
    pub fn notification_read(&self, id: i64) -> Option<bool> {
        self.state
            .data()
            .notifications
            .iter()
            .find(|n| n.get("id").and_then(Value::as_i64) == Some(id))
            .and_then(|n| n.get("read").and_then(Value::as_bool))
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A URL on which nothing is listening.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn closed_port_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("closed port URL")
}
