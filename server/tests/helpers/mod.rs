//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp`, a router with every path behind the page-access guard
//! and a stand-in identity layer that reads the caller's role from the
//! `x-test-role` header.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{self, Method, Response};
use axum::middleware::{self, Next};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use home21_server::guard::{self, CurrentRole};
use home21_server::permissions::{AuthorizerStore, Role, RuleTable};

/// Header the test identity layer reads the caller's role from.
pub const ROLE_HEADER: &str = "x-test-role";

/// Test application with a guarded router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<AuthorizerStore>,
}

impl TestApp {
    /// App guarded by the stock rule table.
    pub fn new() -> Self {
        Self::with_rules(RuleTable::default_table())
    }

    /// App guarded by a custom rule table.
    pub fn with_rules(rules: RuleTable) -> Self {
        let store = Arc::new(AuthorizerStore::from_table(rules));
        let pages = Router::new()
            .route("/", get(page))
            .route("/{*path}", get(page));
        let router = guard::protect(pages, store.clone()).layer(middleware::from_fn(identity));

        Self { router, store }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        http::Request::builder().method(method).uri(uri)
    }

    /// GET `uri` as `role` (`None` for an anonymous guest).
    pub fn get_as(role: Option<Role>, uri: &str) -> http::Request<Body> {
        let mut builder = Self::request(Method::GET, uri);
        if let Some(role) = role {
            builder = builder.header(ROLE_HEADER, role.as_str());
        }
        builder.body(Body::empty()).unwrap()
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: http::Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn page() -> &'static str {
    "ok"
}

/// Stand-in for the real identity layer. Unknown role names are treated as
/// no role at all.
async fn identity(mut request: Request, next: Next) -> axum::response::Response {
    let role = request
        .headers()
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Role>().ok());
    request.extensions_mut().insert(CurrentRole(role));
    next.run(request).await
}
