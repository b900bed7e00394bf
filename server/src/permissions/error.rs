//! Error types for the permission system.
//!
//! Authorization queries never fail; they answer `false` or an empty set.
//! These errors cover the places where a reason is useful: explaining a
//! refused user-management action, parsing names from untrusted input,
//! and loading a rules file.

use thiserror::Error;

use super::resource::{Action, Resource};
use super::role::Role;

/// Why a user-management check was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// No authenticated actor.
    #[error("Authentication required")]
    Unauthenticated,

    /// Actor lacks the required resource permission.
    #[error("Missing permission: {action} on {resource}")]
    MissingPermission { resource: Resource, action: Action },

    /// Actor does not outrank the target.
    #[error("Cannot manage a {target} account as {actor}")]
    RoleHierarchy { actor: Role, target: Role },
}

/// Failure to parse a role, resource, action or special permission name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseError {
    /// What was being parsed ("role", "resource", ...).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Errors raised while building or loading a rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rules file could not be read.
    #[error("Failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    /// Rules file is not valid JSON for the expected layout.
    #[error("Invalid rules file: {0}")]
    Json(#[from] serde_json::Error),

    /// A role, resource, action or special permission name is unknown.
    #[error(transparent)]
    UnknownName(#[from] ParseError),

    /// A page pattern is malformed.
    #[error("Invalid page pattern: {0}")]
    InvalidPagePattern(String),

    /// Strict mode rejected a table where a higher role loses access.
    #[error("Rule table is not monotonic ({} violation(s)); first: {}", .0.len(), .0.first().map(String::as_str).unwrap_or(""))]
    NotMonotonic(Vec<String>),
}
