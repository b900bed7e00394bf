//! Server-side enforcement of page access.
//!
//! The identity layer inserts a [`CurrentRole`] extension; routes wrapped in
//! [`require_page_access`] are refused unless that role may open the path.

pub mod middleware;
pub mod types;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};

use crate::permissions::AuthorizerStore;

pub use middleware::require_page_access;
pub use types::{authorize, AccessDenied, CurrentRole};

/// Wrap every route of `router` in the page-access guard.
pub fn protect<S>(router: Router<S>, store: Arc<AuthorizerStore>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(store, require_page_access))
}
