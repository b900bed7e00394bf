//! Role-based access control.
//!
//! - [`Role`]: ordered account roles, `None` meaning an anonymous guest
//! - [`Resource`] / [`Action`] / [`ActionSet`]: resource permissions
//! - [`SpecialPermission`]: capabilities outside the resource model
//! - [`RuleTable`]: the grants of every role, built-in or loaded from JSON
//! - [`Authorizer`]: the queries, answered from one rule table
//! - [`AuthorizerStore`]: the active authorizer, replaceable at runtime

pub mod engine;
pub mod error;
pub mod page;
pub mod resource;
pub mod role;
pub mod rules;
pub mod special;
pub mod store;

pub use engine::{Authorizer, ResourceGrant, RoleSummary};
pub use error::{ParseError, PermissionError, RuleError};
pub use page::{normalize_path, PagePattern};
pub use resource::{Action, ActionSet, Resource};
pub use role::Role;
pub use rules::{RoleRules, RuleTable, RuleTableBuilder};
pub use special::SpecialPermission;
pub use store::AuthorizerStore;
