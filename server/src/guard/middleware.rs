//! Page-access middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::types::{AccessDenied, CurrentRole};
use crate::permissions::{normalize_path, AuthorizerStore, Resource};

/// Middleware that lets a request through only if the caller's role may open
/// the requested path.
#[tracing::instrument(skip(store, request, next), fields(path = %request.uri().path()))]
pub async fn require_page_access(
    State(store): State<Arc<AuthorizerStore>>,
    request: Request,
    next: Next,
) -> Result<Response, AccessDenied> {
    let role = CurrentRole::from_extensions(request.extensions());
    let authz = store.current();
    let path = request.uri().path();

    if !authz.can_access_page(role, path) {
        tracing::debug!(?role, path, "Page access denied");
        let resource = normalize_path(path).and_then(|path| Resource::for_path(&path));
        return Err(AccessDenied::new(&authz, role, resource));
    }

    Ok(next.run(request).await)
}
