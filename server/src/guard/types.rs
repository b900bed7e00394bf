//! Guard types.

use axum::{
    http::{Extensions, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::permissions::{Action, Authorizer, Resource, Role};

/// Role of the caller, inserted as a request extension by the identity layer.
///
/// A request without this extension, or with `CurrentRole(None)`, is a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrentRole(pub Option<Role>);

impl CurrentRole {
    /// Role carried by a request, if any.
    #[must_use]
    pub fn from_extensions(extensions: &Extensions) -> Option<Role> {
        extensions.get::<Self>().and_then(|current| current.0)
    }
}

/// Generic text used when a denied path belongs to no resource.
const GENERIC_DENIAL: &str = "You do not have access to this page.";

/// Refusal returned by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// Caller is a guest and must sign in.
    #[error("{0}")]
    SignInRequired(String),

    /// Caller is signed in but its role does not allow the request.
    #[error("{0}")]
    Forbidden(String),
}

impl AccessDenied {
    /// Build the refusal for `role`, explaining access to `resource` when the
    /// request maps to one.
    #[must_use]
    pub fn new(authz: &Authorizer, role: Option<Role>, resource: Option<Resource>) -> Self {
        let message = resource.map_or_else(
            || GENERIC_DENIAL.to_string(),
            |resource| authz.access_denied_message(role, resource),
        );
        match Role::or_guest(role) {
            Role::Guest => Self::SignInRequired(message),
            _ => Self::Forbidden(message),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SignInRequired(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::SignInRequired(message) | Self::Forbidden(message) => message,
        }
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let code = match self {
            Self::SignInRequired(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
        };
        let body = serde_json::json!({"error": code, "message": self.message()});
        (self.status(), Json(body)).into_response()
    }
}

/// Handler-side check for a resource action.
///
/// Returns the same refusal the page guard would, so handlers can use `?`.
pub fn authorize(
    authz: &Authorizer,
    role: Option<Role>,
    resource: Resource,
    action: Action,
) -> Result<(), AccessDenied> {
    if authz.has_permission(role, resource, action) {
        Ok(())
    } else {
        tracing::debug!(?role, %resource, %action, "Action denied");
        Err(AccessDenied::new(authz, role, Some(resource)))
    }
}
