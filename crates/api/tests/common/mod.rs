//! Common test utilities for integration tests.
//!
//! The API talks to Supabase over HTTP, so the tests start an in-process
//! mock of the PostgREST and Storage endpoints on an ephemeral port. Each
//! test registers canned responses and asserts on the recorded requests.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::SupabaseConfig;
use school_portal_api::config::{
    Config, LoggingConfig, SecurityConfig, ServerConfig, SessionConfig, StorageConfig,
};
use serde_json::{json, Value};
use shared::session::{SessionCodec, SessionUser};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A canned upstream response.
#[derive(Debug, Clone)]
struct MockRoute {
    method: Method,
    path: String,
    query_contains: Option<String>,
    status: StatusCode,
    body: Value,
    headers: Vec<(String, String)>,
}

/// A request received by the mock upstream. `query` is percent-decoded.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct MockState {
    routes: Vec<MockRoute>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the Supabase REST and Storage APIs.
///
/// Unmatched requests get `200 []` with `Content-Range: */0`, which reads
/// as an empty table for selects and counts.
#[derive(Clone)]
pub struct MockUpstream {
    addr: SocketAddr,
    state: Shared,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .fallback(handle)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Mock upstream address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock upstream failed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn push(&self, route: MockRoute) {
        self.state.lock().unwrap().routes.push(route);
    }

    /// Responds to `method path` with a JSON body. A trailing `*` in
    /// `path` matches any suffix.
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(MockRoute {
            method,
            path: path.to_string(),
            query_contains: None,
            status: StatusCode::from_u16(status).unwrap(),
            body,
            headers: Vec::new(),
        });
    }

    /// Like [`on`](Self::on) but only when the decoded query contains
    /// `needle`. Query-specific routes win over plain ones.
    pub fn on_query(&self, method: Method, path: &str, needle: &str, status: u16, body: Value) {
        self.push(MockRoute {
            method,
            path: path.to_string(),
            query_contains: Some(needle.to_string()),
            status: StatusCode::from_u16(status).unwrap(),
            body,
            headers: Vec::new(),
        });
    }

    /// Responds to a count request on `path` (filtered by `needle`).
    pub fn on_count(&self, path: &str, needle: Option<&str>, total: u64) {
        self.push(MockRoute {
            method: Method::GET,
            path: path.to_string(),
            query_contains: needle.map(str::to_string),
            status: StatusCode::OK,
            body: json!([]),
            headers: vec![("content-range".into(), format!("0-0/{}", total))],
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let path = uri.path().to_string();

    let mut guard = state.lock().unwrap();
    guard.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers,
        body,
    });

    let matches = |r: &&MockRoute| r.method == method && path_matches(&r.path, &path);
    let route = guard
        .routes
        .iter()
        .filter(matches)
        .find(|r| {
            r.query_contains
                .as_deref()
                .map(|needle| query.contains(needle))
                .unwrap_or(false)
        })
        .or_else(|| {
            guard
                .routes
                .iter()
                .filter(matches)
                .find(|r| r.query_contains.is_none())
        })
        .cloned();

    match route {
        Some(route) => {
            let mut response = (route.status, axum::Json(route.body)).into_response();
            for (name, value) in route.headers {
                response.headers_mut().insert(
                    header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    value.parse().unwrap(),
                );
            }
            response
        }
        None => (
            StatusCode::OK,
            [(header::CONTENT_RANGE, "*/0")],
            axum::Json(json!([])),
        )
            .into_response(),
    }
}

/// Exact match, or prefix match when the pattern ends with `*`.
fn path_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => pattern == path,
    }
}

/// Configuration pointing at the mock upstream, rate limiting off.
pub fn test_config(upstream_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_size: 1_048_576,
        },
        supabase: SupabaseConfig {
            url: upstream_url.to_string(),
            anon_key: "test-anon-key".to_string(),
            service_role_key: "test-service-key".to_string(),
            timeout_secs: 5,
        },
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            ttl_secs: 3600,
            leeway_secs: 0,
            cookie_name: "session".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
            domain: String::new(),
        },
        storage: StorageConfig {
            enrollment_bucket: "inscripciones".to_string(),
            materials_bucket: "materiales".to_string(),
            max_upload_bytes: 64 * 1024,
            max_documents: 3,
            signed_url_ttl_secs: 600,
        },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0,
            hsts_enabled: false,
            trust_forwarded_for: false,
        },
    }
}

/// Starts a mock upstream and builds the router against it.
pub async fn create_test_app() -> (Router, MockUpstream) {
    let upstream = MockUpstream::start().await;
    let app = school_portal_api::app::create_app(test_config(&upstream.url()))
        .expect("Failed to build app");
    (app, upstream)
}

/// A profile row as PostgREST returns it.
pub fn profile_row(id: Uuid, rol: &str) -> Value {
    let nombre: String = Name().fake();
    let correo: String = SafeEmail().fake();
    let dni: u32 = (30_000_000..49_999_999).fake();
    json!({
        "id": id,
        "nombre_completo": nombre,
        "correo": correo,
        "dni": dni.to_string(),
        "telefono": null,
        "rol": rol,
    })
}

/// `Cookie` header value for a signed session of the given role.
pub fn session_cookie(id: Uuid, role: &str) -> String {
    let codec = SessionCodec::new(TEST_SECRET, 3600).expect("Failed to build session codec");
    let user = SessionUser {
        id,
        nombre: "Usuario de prueba".to_string(),
        correo: format!("{}@escuela.test", role),
        dni: "30111222".to_string(),
        role: role.to_string(),
    };
    let token = codec.issue(&user).expect("Failed to issue session");
    format!("session={}", token)
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// One multipart part: (field name, optional (filename, content type), bytes).
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub const BOUNDARY: &str = "----school-portal-test-boundary";

pub fn multipart_request(uri: &str, parts: &[Part<'_>], cookie: Option<&str>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, file, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((filename, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
