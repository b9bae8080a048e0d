//! Integration tests for the Via Fitness storefront.
//!
//! Each test starts a [`MockBackend`] (the Via Fitness API and `ViaCEP` on
//! one ephemeral port) and a [`TestApp`] (the real storefront router on
//! another), then drives the storefront with a cookie-keeping `reqwest`
//! client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p viafitness-integration-tests
//! ```

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use viafitness_storefront::{app, config::StorefrontConfig, state::AppState};

/// A CEP the mock `ViaCEP` knows.
pub const KNOWN_CEP: &str = "01001000";

/// Password of every user created with [`MockBackend::add_user`].
pub const PASSWORD: &str = "senha-forte-123";

// ============================================================================
// Mock backend state
// ============================================================================

#[derive(Debug, Clone)]
struct MockUser {
    id: u64,
    username: String,
    email: String,
    password: String,
    name: String,
    is_superuser: bool,
    avatar: Option<String>,
}

#[derive(Debug, Clone)]
struct MockAddress {
    id: u64,
    user_id: u64,
    fields: Value,
    is_default: bool,
}

impl MockAddress {
    fn to_json(&self) -> Value {
        let mut body = self.fields.clone();
        body["id"] = json!(self.id);
        body["is_default"] = json!(self.is_default);
        body
    }
}

#[derive(Debug, Default)]
struct MockData {
    next_id: u64,
    users: Vec<MockUser>,
    tokens: HashMap<String, u64>,
    products: Vec<Value>,
    addresses: Vec<MockAddress>,
    /// Address ids whose DELETE answers 500.
    locked_addresses: HashSet<u64>,
    product_uploads: Vec<HashMap<String, String>>,
}

impl MockData {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<MockUser> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let user_id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *user_id).cloned()
    }
}

#[derive(Debug, Default)]
struct MockState {
    data: Mutex<MockData>,
    requests: AtomicUsize,
    /// Every request answers 500 while set.
    failing: std::sync::atomic::AtomicBool,
}

impl MockState {
    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().expect("mock state poisoned")
    }
}

type Shared = Arc<MockState>;

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

// ============================================================================
// Mock handlers
// ============================================================================

async fn count_requests(State(state): State<Shared>, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    next.run(request).await
}

async fn hello() -> Json<Value> {
    Json(json!({"message": "Hello from Django"}))
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut data = state.data();
    if data.users.iter().any(|u| u.email == body.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        )
            .into_response();
    }
    let id = data.next_id();
    data.users.push(MockUser {
        id,
        username: body.username.clone(),
        email: body.email.clone(),
        password: body.password,
        name: String::new(),
        is_superuser: false,
        avatar: None,
    });
    (
        StatusCode::CREATED,
        Json(json!({"id": id, "username": body.username, "email": body.email})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut data = state.data();
    let Some(user) = data
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response();
    };

    let access = Uuid::new_v4().to_string();
    data.tokens.insert(access.clone(), user.id);
    Json(json!({
        "access": access,
        "refresh": Uuid::new_v4().to_string(),
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "name": user.name,
            "is_superuser": user.is_superuser,
        },
    }))
    .into_response()
}

async fn products(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.data().products.clone()))
}

async fn add_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if state.data().user_for(&headers).is_none() {
        return unauthorized();
    }

    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let _ = field.bytes().await;
            fields.insert(name, file_name);
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }

    let mut data = state.data();
    let id = data.next_id();
    data.products.push(json!({
        "id": id,
        "name": fields.get("name").cloned().unwrap_or_default(),
        "quantity": fields.get("quantity").and_then(|q| q.parse::<i64>().ok()),
        "color": fields.get("color").cloned().unwrap_or_default(),
        "size": fields.get("size").cloned().unwrap_or_default(),
        "wholesale_price": fields.get("wholesale_price").cloned().unwrap_or_default(),
        "retail_price": fields.get("retail_price").cloned().unwrap_or_default(),
        "reference": fields.get("reference").cloned().unwrap_or_default(),
        "photo": format!("/media/products/{}", fields.get("photo").cloned().unwrap_or_default()),
    }));
    data.product_uploads.push(fields);
    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let Some(user) = state.data().user_for(&headers) else {
        return unauthorized();
    };
    Json(json!({
        "username": user.username,
        "email": user.email,
        "avatar": user.avatar,
    }))
    .into_response()
}

async fn avatar(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let Some(user) = state.data().user_for(&headers) else {
        return unauthorized();
    };
    Json(json!({"avatar_url": user.avatar})).into_response()
}

async fn upload_avatar(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let Some(user) = state.data().user_for(&headers) else {
        return unauthorized();
    };

    let mut file_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("avatar") {
            file_name = field.file_name().map(str::to_string);
            let _ = field.bytes().await;
        }
    }
    let Some(file_name) = file_name else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No file"}))).into_response();
    };

    let url = format!("/media/avatars/{file_name}");
    let mut data = state.data();
    if let Some(stored) = data.users.iter_mut().find(|u| u.id == user.id) {
        stored.avatar = Some(url.clone());
    }
    Json(json!({"avatar_url": url})).into_response()
}

async fn list_addresses(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = state.data();
    let Some(user) = data.user_for(&headers) else {
        return unauthorized();
    };
    let addresses: Vec<Value> = data
        .addresses
        .iter()
        .filter(|a| a.user_id == user.id)
        .map(MockAddress::to_json)
        .collect();
    Json(Value::Array(addresses)).into_response()
}

/// Creating a default address clears the flag on the user's others.
async fn create_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut data = state.data();
    let Some(user) = data.user_for(&headers) else {
        return unauthorized();
    };
    if body["street"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"street": ["This field is required."]})),
        )
            .into_response();
    }

    let is_default = body["is_default"].as_bool().unwrap_or(false);
    if let Some(fields) = body.as_object_mut() {
        fields.remove("is_default");
    }
    if is_default {
        for address in data.addresses.iter_mut().filter(|a| a.user_id == user.id) {
            address.is_default = false;
        }
    }
    let id = data.next_id();
    let address = MockAddress {
        id,
        user_id: user.id,
        fields: body,
        is_default,
    };
    let response = address.to_json();
    data.addresses.push(address);
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn delete_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    let mut data = state.data();
    let Some(user) = data.user_for(&headers) else {
        return unauthorized();
    };
    if data.locked_addresses.contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let before = data.addresses.len();
    data.addresses
        .retain(|a| !(a.id == id && a.user_id == user.id));
    if data.addresses.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn viacep(Path(cep): Path<String>) -> Json<Value> {
    if cep == KNOWN_CEP {
        Json(json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
        }))
    } else {
        Json(json!({"erro": "true"}))
    }
}

// ============================================================================
// MockBackend
// ============================================================================

/// The Via Fitness API and `ViaCEP`, served in-process.
#[derive(Clone)]
pub struct MockBackend {
    pub url: String,
    state: Shared,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Shared::default();
        let router = Router::new()
            .route("/api/hello/", get(hello))
            .route("/register/", post(register))
            .route("/login/", post(login))
            .route("/products/", get(products))
            .route("/products/add/", post(add_product))
            .route("/profile/", get(profile))
            .route("/profile/avatar/", get(avatar).post(upload_avatar))
            .route(
                "/profile/addresses/",
                get(list_addresses).post(create_address),
            )
            .route("/profile/addresses/{id}/", delete(delete_address))
            .route("/ws/{cep}/json/", get(viacep))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                count_requests,
            ))
            .with_state(Arc::clone(&state));

        let addr = serve(router).await;
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// A backend address nothing listens on.
    pub fn unreachable() -> Self {
        Self {
            url: "http://127.0.0.1:1".to_string(),
            state: Shared::default(),
        }
    }

    /// Create an account; returns its id.
    pub fn add_user(&self, username: &str, email: &str, name: &str, is_superuser: bool) -> u64 {
        let mut data = self.state.data();
        let id = data.next_id();
        data.users.push(MockUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            name: name.to_string(),
            is_superuser,
            avatar: None,
        });
        id
    }

    /// Add a product to the catalogue; returns its id.
    pub fn add_product(&self, name: &str, retail_price: &str, photos: &[&str]) -> u64 {
        let mut data = self.state.data();
        let id = data.next_id();
        data.products.push(json!({
            "id": id,
            "name": name,
            "quantity": 10,
            "color": "Preto",
            "size": "M",
            "wholesale_price": "50.00",
            "retail_price": retail_price,
            "reference": format!("REF-{id}"),
            "photo": photos.first(),
            "photos": photos.get(1..).unwrap_or_default(),
        }));
        id
    }

    /// Store an address directly, as if created earlier.
    pub fn seed_address(&self, user_id: u64, street: &str, is_default: bool) -> u64 {
        let mut data = self.state.data();
        let id = data.next_id();
        data.addresses.push(MockAddress {
            id,
            user_id,
            fields: json!({
                "street": street,
                "neighborhood": "Centro",
                "city": "São Paulo",
                "state": "SP",
                "postal_code": KNOWN_CEP,
            }),
            is_default,
        });
        id
    }

    /// Make deleting address `id` fail with 500.
    pub fn lock_address(&self, id: u64) {
        self.state.data().locked_addresses.insert(id);
    }

    /// `(street, is_default)` of a user's addresses, in id order.
    pub fn addresses_of(&self, user_id: u64) -> Vec<(String, bool)> {
        let data = self.state.data();
        let mut addresses: Vec<&MockAddress> =
            data.addresses.iter().filter(|a| a.user_id == user_id).collect();
        addresses.sort_by_key(|a| a.id);
        addresses
            .into_iter()
            .map(|a| {
                (
                    a.fields["street"].as_str().unwrap_or_default().to_string(),
                    a.is_default,
                )
            })
            .collect()
    }

    /// Text fields of every product posted to `/products/add/`; the photo
    /// entry holds the file name.
    pub fn product_uploads(&self) -> Vec<HashMap<String, String>> {
        self.state.data().product_uploads.clone()
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn expire_tokens(&self) {
        self.state.data().tokens.clear();
    }

    /// Make every request fail with 500 (or stop doing so).
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of requests received so far.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });
    addr
}

// ============================================================================
// TestApp
// ============================================================================

/// The storefront, served in-process against a [`MockBackend`].
pub struct TestApp {
    pub url: String,
    pub backend: MockBackend,
    /// Follows redirects, like a browser.
    pub client: reqwest::Client,
    /// Shares the cookie jar of `client` but stops at redirects.
    pub no_redirect: reqwest::Client,
}

impl TestApp {
    /// Start a backend and a storefront pointed at it.
    pub async fn spawn() -> Self {
        Self::spawn_with(MockBackend::start().await).await
    }

    /// Start a storefront pointed at `backend`.
    pub async fn spawn_with(backend: MockBackend) -> Self {
        let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static");
        let settings: HashMap<&str, String> = HashMap::from([
            ("STOREFRONT_API_URL", backend.url.clone()),
            ("STOREFRONT_CEP_URL", backend.url.clone()),
            ("STOREFRONT_API_TIMEOUT_SECS", "5".to_string()),
            ("STOREFRONT_STATIC_DIR", static_dir.to_string()),
        ]);
        let config = StorefrontConfig::from_source(|key| settings.get(key).cloned())
            .expect("Invalid test configuration");
        let state = AppState::new(config).expect("Failed to build app state");

        let addr = serve(app::router(state)).await;

        let jar = Arc::new(reqwest::cookie::Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .expect("Failed to build client");
        let no_redirect = reqwest::Client::builder()
            .cookie_provider(jar)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build client");

        Self {
            url: format!("http://{addr}"),
            backend,
            client,
            no_redirect,
        }
    }

    /// Absolute URL of a storefront path.
    pub fn at(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// `GET` a page and return its body.
    pub async fn page(&self, path: &str) -> String {
        self.client
            .get(self.at(path))
            .send()
            .await
            .expect("Request failed")
            .text()
            .await
            .expect("Body was not text")
    }

    /// `POST` a form, following redirects, and return the final response.
    pub async fn submit(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.at(path))
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }

    /// `POST` a form without following the redirect.
    pub async fn submit_no_redirect(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.no_redirect
            .post(self.at(path))
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }

    /// Create a user on the backend and log in as them; returns the user id.
    pub async fn login_as(&self, username: &str, is_superuser: bool) -> u64 {
        let email = format!("{username}@example.com");
        let id = self.backend.add_user(username, &email, "", is_superuser);
        let response = self
            .submit("/login", &[("email", &email), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        id
    }
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
