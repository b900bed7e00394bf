//! Authorization queries.
//!
//! Every query is a pure function of its inputs and the rule table, and
//! fails closed: an absent role is a guest, an unknown name grants nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::error::PermissionError;
use super::page::normalize_path;
use super::resource::{Action, ActionSet, Resource};
use super::role::Role;
use super::rules::RuleTable;
use super::special::SpecialPermission;

/// Answers authorization queries against one immutable rule table.
///
/// Cheap to clone; clones share the table.
#[derive(Debug, Clone)]
pub struct Authorizer {
    rules: Arc<RuleTable>,
}

impl Authorizer {
    /// Wrap a rule table.
    #[must_use]
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// The table this authorizer consults.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Check whether `role` may perform `action` on `resource`.
    ///
    /// `MANAGE` on a resource grants every action on it.
    ///
    /// # Examples
    ///
    /// ```
    /// use home21_server::permissions::{Action, Authorizer, Resource, Role};
    ///
    /// let authz = Authorizer::default();
    /// assert!(authz.has_permission(Some(Role::Admin), Resource::Houses, Action::Delete));
    /// assert!(!authz.has_permission(None, Resource::Houses, Action::View));
    /// ```
    #[must_use]
    pub fn has_permission(&self, role: Option<Role>, resource: Resource, action: Action) -> bool {
        self.rules
            .rules(Role::or_guest(role))
            .actions(resource)
            .allows(action)
    }

    /// Check whether `role` may open the page at `path`.
    ///
    /// The path is normalized first; paths that cannot be normalized safely
    /// (relative, or containing `.`/`..` segments) are denied.
    #[must_use]
    pub fn can_access_page(&self, role: Option<Role>, path: &str) -> bool {
        let Some(path) = normalize_path(path) else {
            return false;
        };
        self.rules
            .rules(Role::or_guest(role))
            .page_access()
            .iter()
            .any(|pattern| pattern.matches(&path))
    }

    /// Check a special permission by name. Unknown names are denied.
    #[must_use]
    pub fn has_special_permission(&self, role: Option<Role>, name: &str) -> bool {
        name.parse::<SpecialPermission>()
            .is_ok_and(|permission| self.has_special(role, permission))
    }

    /// Check a special permission.
    #[must_use]
    pub fn has_special(&self, role: Option<Role>, permission: SpecialPermission) -> bool {
        self.rules
            .rules(Role::or_guest(role))
            .special()
            .contains(&permission)
    }

    /// Check whether `actor` may perform `action` on a user account holding
    /// `target`.
    ///
    /// Rules:
    /// 1. Actor must hold `action` (or `MANAGE`) on `USERS`
    /// 2. Actor must strictly outrank the target, except that a super admin
    ///    may view another super admin
    pub fn check_manage_user(
        &self,
        actor: Option<Role>,
        target: Role,
        action: Action,
    ) -> Result<(), PermissionError> {
        let Some(actor) = actor else {
            return Err(PermissionError::Unauthenticated);
        };

        if !self.has_permission(Some(actor), Resource::Users, action) {
            return Err(PermissionError::MissingPermission {
                resource: Resource::Users,
                action,
            });
        }

        let peer_view =
            actor == Role::SuperAdmin && target == Role::SuperAdmin && action == Action::View;
        if actor.rank() <= target.rank() && !peer_view {
            return Err(PermissionError::RoleHierarchy { actor, target });
        }

        Ok(())
    }

    /// Boolean form of [`check_manage_user`](Self::check_manage_user).
    #[must_use]
    pub fn can_manage_user(&self, actor: Option<Role>, target: Role, action: Action) -> bool {
        match self.check_manage_user(actor, target, action) {
            Ok(()) => true,
            Err(reason) => {
                debug!(?actor, %target, %action, %reason, "User management denied");
                false
            }
        }
    }

    /// Roles `actor` may give to a new or existing account.
    ///
    /// The actor must be able to create and update users. It may assign
    /// roles ranked at or below its own; `SUPER_ADMIN` additionally needs
    /// the `CREATE_SUPER_ADMIN` special permission.
    #[must_use]
    pub fn assignable_roles(&self, actor: Option<Role>) -> BTreeSet<Role> {
        let actor_role = Role::or_guest(actor);
        let can_edit_users = self.has_permission(Some(actor_role), Resource::Users, Action::Create)
            && self.has_permission(Some(actor_role), Resource::Users, Action::Update);
        if !can_edit_users {
            return BTreeSet::new();
        }

        let may_create_super_admin =
            self.has_special(Some(actor_role), SpecialPermission::CreateSuperAdmin);

        Role::assignable()
            .iter()
            .copied()
            .filter(|role| role.rank() <= actor_role.rank())
            .filter(|role| *role != Role::SuperAdmin || may_create_super_admin)
            .collect()
    }

    /// Every action `role` may perform on `resource`, `MANAGE` expanded.
    ///
    /// For driving UI affordances; enforcement goes through
    /// [`has_permission`](Self::has_permission).
    #[must_use]
    pub fn available_actions(&self, role: Option<Role>, resource: Resource) -> ActionSet {
        self.rules
            .rules(Role::or_guest(role))
            .actions(resource)
            .effective()
    }

    /// Generic explanation shown when `role` is refused access to `resource`.
    ///
    /// Depends only on the role and resource, never on a specific record.
    #[must_use]
    pub fn access_denied_message(&self, role: Option<Role>, resource: Resource) -> String {
        let what = resource.label();
        match Role::or_guest(role) {
            Role::Guest => format!("Please sign in to access {what}."),
            Role::Resident => format!(
                "Your resident account does not give access to {what}. \
                 Ask your encadrant if you need it."
            ),
            Role::Encadrant => format!(
                "Encadrant accounts cannot perform this action on {what}. \
                 Contact an administrator."
            ),
            Role::Admin => format!(
                "This action on {what} is reserved for super administrators."
            ),
            Role::SuperAdmin => format!("This action on {what} is not available."),
        }
    }

    /// Display metadata and effective permissions for one role.
    #[must_use]
    pub fn role_summary(&self, role: Role) -> RoleSummary {
        let rules = self.rules.rules(role);
        RoleSummary {
            role,
            label: role.label(),
            description: role.description(),
            rank: role.rank(),
            permissions: Resource::all()
                .iter()
                .filter_map(|resource| {
                    let actions = self.available_actions(Some(role), *resource);
                    (!actions.is_empty()).then(|| ResourceGrant {
                        resource: *resource,
                        actions: actions.actions(),
                    })
                })
                .collect(),
            pages: rules.page_access().iter().map(ToString::to_string).collect(),
            special: rules.special().iter().copied().collect(),
            assignable_roles: self.assignable_roles(Some(role)).into_iter().collect(),
        }
    }

    /// Summaries for every role, lowest rank first.
    #[must_use]
    pub fn permission_matrix(&self) -> Vec<RoleSummary> {
        Role::all()
            .iter()
            .map(|role| self.role_summary(*role))
            .collect()
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(RuleTable::default_table())
    }
}

/// Effective access of one role, for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSummary {
    pub role: Role,
    pub label: &'static str,
    pub description: &'static str,
    pub rank: u8,
    pub permissions: Vec<ResourceGrant>,
    pub pages: Vec<String>,
    pub special: Vec<SpecialPermission>,
    pub assignable_roles: Vec<Role>,
}

/// Actions a role may perform on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGrant {
    pub resource: Resource,
    pub actions: Vec<Action>,
}
