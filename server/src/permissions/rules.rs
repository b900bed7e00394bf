//! The rule table: one source of truth for resource permissions, page access
//! and special permissions, keyed by role.
//!
//! Page access is derived from resource permissions: a role that may `VIEW`
//! a resource may open every page under that resource's base path. Each role
//! also carries an explicit list of pages that belong to no resource.
//!
//! Tables are immutable once built. Use [`RuleTable::default_table`] for the
//! stock Home21 rules, [`RuleTable::builder`] for custom tables, or
//! [`RuleTable::load`] for a JSON rules file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::RuleError;
use super::page::PagePattern;
use super::resource::{Action, ActionSet, Resource};
use super::role::Role;
use super::special::SpecialPermission;

/// Pages every visitor may open, signed in or not.
const PUBLIC_PAGES: &[&str] = &["/", "/login", "/unauthorized"];

/// Pages every signed-in user may open.
const ACCOUNT_PAGES: &[&str] = &["/profile"];

/// Rules attached to a single role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRules {
    permissions: BTreeMap<Resource, ActionSet>,
    extra_pages: Vec<PagePattern>,
    special: BTreeSet<SpecialPermission>,
    /// Derived pages followed by the extra pages; filled in by the table.
    page_access: Vec<PagePattern>,
}

impl RoleRules {
    /// Actions granted on `resource`, as written (MANAGE not expanded).
    #[must_use]
    pub fn actions(&self, resource: Resource) -> ActionSet {
        self.permissions.get(&resource).copied().unwrap_or_default()
    }

    /// Full page list: derived resource pages plus explicit extras.
    #[must_use]
    pub fn page_access(&self) -> &[PagePattern] {
        &self.page_access
    }

    /// Special permissions held by the role.
    #[must_use]
    pub const fn special(&self) -> &BTreeSet<SpecialPermission> {
        &self.special
    }

    /// Whether this role holds any action, special permission or page that
    /// `lower` does not.
    fn grants_beyond(&self, lower: &Self) -> bool {
        let more_actions = Resource::all().iter().any(|resource| {
            !(self.actions(*resource).effective() - lower.actions(*resource).effective()).is_empty()
        });
        let more_special = !self.special.is_subset(&lower.special);
        let more_pages = self.page_access().iter().any(|page| {
            !lower
                .page_access()
                .iter()
                .any(|other| page.is_covered_by(other))
        });
        more_actions || more_special || more_pages
    }

    fn resolve_pages(&mut self) {
        let mut pages: Vec<PagePattern> = self
            .permissions
            .iter()
            .filter(|(_, actions)| actions.allows(Action::View))
            .map(|(resource, _)| PagePattern::prefix(resource.base_path()))
            .collect();
        for extra in &self.extra_pages {
            if !pages.contains(extra) {
                pages.push(extra.clone());
            }
        }
        self.page_access = pages;
    }
}

/// Immutable role → rules mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    roles: BTreeMap<Role, RoleRules>,
    empty: RoleRules,
}

impl RuleTable {
    /// Start building a custom table. Roles never mentioned get no access.
    #[must_use]
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// Stock Home21 rules.
    ///
    /// | Role | Grants |
    /// |---|---|
    /// | GUEST | public pages only |
    /// | RESIDENT | dashboard, own service requests, task list |
    /// | ENCADRANT | + residents (view/update), houses (view), tasks and services (no delete), user list |
    /// | ADMIN | manage users, residents, houses, tasks, services; view/update settings |
    /// | SUPER_ADMIN | manage everything, every page, every special permission |
    #[must_use]
    pub fn default_table() -> Self {
        use Resource::{Dashboard, Houses, Residents, Services, Settings, Tasks, Users};

        let mut builder = Self::builder();

        for role in Role::all() {
            for page in PUBLIC_PAGES {
                builder = builder.page_pattern(*role, PagePattern::Exact((*page).to_string()));
            }
        }
        for role in Role::assignable() {
            for page in ACCOUNT_PAGES {
                builder = builder.page_pattern(*role, PagePattern::Exact((*page).to_string()));
            }
        }

        let builder = builder
            // Resident
            .grant(Role::Resident, Dashboard, ActionSet::VIEW)
            .grant(Role::Resident, Services, ActionSet::VIEW | ActionSet::CREATE)
            .grant(Role::Resident, Tasks, ActionSet::VIEW)
            // Encadrant
            .grant(Role::Encadrant, Dashboard, ActionSet::VIEW)
            .grant(Role::Encadrant, Users, ActionSet::VIEW)
            .grant(Role::Encadrant, Residents, ActionSet::VIEW | ActionSet::UPDATE)
            .grant(Role::Encadrant, Houses, ActionSet::VIEW)
            .grant(
                Role::Encadrant,
                Tasks,
                ActionSet::VIEW | ActionSet::CREATE | ActionSet::UPDATE,
            )
            .grant(
                Role::Encadrant,
                Services,
                ActionSet::VIEW | ActionSet::CREATE | ActionSet::UPDATE,
            )
            .special(Role::Encadrant, SpecialPermission::ViewReports)
            // Admin
            .grant(Role::Admin, Dashboard, ActionSet::VIEW)
            .grant(Role::Admin, Users, ActionSet::MANAGE)
            .grant(Role::Admin, Residents, ActionSet::MANAGE)
            .grant(Role::Admin, Houses, ActionSet::MANAGE)
            .grant(Role::Admin, Tasks, ActionSet::MANAGE)
            .grant(Role::Admin, Services, ActionSet::MANAGE)
            .grant(Role::Admin, Settings, ActionSet::VIEW | ActionSet::UPDATE)
            .special(Role::Admin, SpecialPermission::ViewReports)
            .special(Role::Admin, SpecialPermission::ExportData)
            // Super admin
            .page_pattern(Role::SuperAdmin, PagePattern::Any);

        let builder = Resource::all().iter().fold(builder, |b, resource| {
            b.grant(Role::SuperAdmin, *resource, ActionSet::MANAGE)
        });
        let builder = SpecialPermission::all()
            .iter()
            .fold(builder, |b, perm| b.special(Role::SuperAdmin, *perm));

        builder.finish()
    }

    /// Parse a JSON rules file body.
    ///
    /// ```json
    /// { "roles": { "ADMIN": { "permissions": { "HOUSES": ["MANAGE"] },
    ///                         "pages": ["/profile"],
    ///                         "special": ["EXPORT_DATA"] } } }
    /// ```
    ///
    /// Unknown role, resource, action or special permission names are errors.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let file: RulesFile = serde_json::from_str(json)?;
        let mut builder = Self::builder();

        for (role_name, entry) in file.roles {
            let role: Role = role_name.parse()?;
            for (resource_name, actions) in entry.permissions {
                let resource: Resource = resource_name.parse()?;
                let actions = actions
                    .iter()
                    .map(|a| a.parse::<Action>())
                    .collect::<Result<ActionSet, _>>()?;
                builder = builder.grant(role, resource, actions);
            }
            for page in &entry.pages {
                builder = builder.page(role, page);
            }
            for name in &entry.special {
                builder = builder.special(role, name.parse()?);
            }
        }

        builder.build()
    }

    /// Read and parse a JSON rules file.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let body = std::fs::read_to_string(path)?;
        let table = Self::from_json(&body)?;
        info!(roles = table.roles.len(), "Loaded rule table from file");
        Ok(table)
    }

    /// Rules for `role`. Roles absent from the table get empty rules.
    #[must_use]
    pub fn rules(&self, role: Role) -> &RoleRules {
        self.roles.get(&role).unwrap_or(&self.empty)
    }

    /// Lists every place where a higher-ranked role has less access than the
    /// role just below it, and every role that gains nothing over it.
    #[must_use]
    pub fn monotonicity_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for pair in Role::all().windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let lower_rules = self.rules(lower);
            let higher_rules = self.rules(higher);

            for resource in Resource::all() {
                let lost = lower_rules.actions(*resource).effective()
                    - higher_rules.actions(*resource).effective();
                for action in lost.actions() {
                    violations.push(format!(
                        "{lower} may {action} {resource} but {higher} may not"
                    ));
                }
            }

            for perm in lower_rules.special.difference(&higher_rules.special) {
                violations.push(format!("{lower} holds {perm} but {higher} does not"));
            }

            for page in lower_rules.page_access() {
                let covered = higher_rules
                    .page_access()
                    .iter()
                    .any(|other| page.is_covered_by(other));
                if !covered {
                    violations.push(format!("{lower} may open {page} but {higher} may not"));
                }
            }

            if !higher_rules.grants_beyond(lower_rules) {
                violations.push(format!("{higher} grants nothing beyond {lower}"));
            }
        }

        violations
    }

    /// Check monotonicity. In strict mode any violation rejects the table;
    /// otherwise each one is logged and the table is kept.
    pub fn validated(self, strict: bool) -> Result<Self, RuleError> {
        let violations = self.monotonicity_violations();
        if violations.is_empty() {
            debug!("Rule table is monotonic");
            return Ok(self);
        }
        if strict {
            return Err(RuleError::NotMonotonic(violations));
        }
        for violation in &violations {
            warn!(%violation, "Rule table grants a lower role more than a higher one");
        }
        Ok(self)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::default_table()
    }
}

/// Builder for [`RuleTable`].
///
/// A malformed page pattern passed to [`page`](Self::page) is remembered and
/// reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    permissions: BTreeMap<Role, BTreeMap<Resource, ActionSet>>,
    pages: BTreeMap<Role, Vec<PagePattern>>,
    special: BTreeMap<Role, BTreeSet<SpecialPermission>>,
    error: Option<RuleError>,
}

impl RuleTableBuilder {
    /// Add actions on a resource to a role. Grants accumulate.
    #[must_use]
    pub fn grant(mut self, role: Role, resource: Resource, actions: ActionSet) -> Self {
        *self
            .permissions
            .entry(role)
            .or_default()
            .entry(resource)
            .or_default() |= actions;
        self
    }

    /// Add an explicit page pattern (`*`, `/exact` or `/prefix/*`) to a role.
    #[must_use]
    pub fn page(self, role: Role, pattern: &str) -> Self {
        match PagePattern::parse(pattern) {
            Ok(parsed) => self.page_pattern(role, parsed),
            Err(err) => {
                let mut builder = self;
                builder.error.get_or_insert(err);
                builder
            }
        }
    }

    /// Add an already parsed page pattern to a role.
    #[must_use]
    pub fn page_pattern(mut self, role: Role, pattern: PagePattern) -> Self {
        self.pages.entry(role).or_default().push(pattern);
        self
    }

    /// Add a special permission to a role.
    #[must_use]
    pub fn special(mut self, role: Role, permission: SpecialPermission) -> Self {
        self.special.entry(role).or_default().insert(permission);
        self
    }

    /// Finish the table, failing on the first malformed page pattern.
    pub fn build(mut self) -> Result<RuleTable, RuleError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(self.finish())
    }

    fn finish(self) -> RuleTable {
        let mut roles: BTreeMap<Role, RoleRules> = BTreeMap::new();

        for (role, permissions) in self.permissions {
            roles.entry(role).or_default().permissions = permissions;
        }
        for (role, patterns) in self.pages {
            roles.entry(role).or_default().extra_pages = patterns;
        }
        for (role, special) in self.special {
            roles.entry(role).or_default().special = special;
        }

        for rules in roles.values_mut() {
            rules.resolve_pages();
        }

        RuleTable {
            roles,
            empty: RoleRules::default(),
        }
    }
}

/// On-disk layout of a rules file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    roles: BTreeMap<String, RoleEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RoleEntry {
    permissions: BTreeMap<String, Vec<String>>,
    pages: Vec<String>,
    special: Vec<String>,
}
