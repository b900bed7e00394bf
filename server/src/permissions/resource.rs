//! Protected resources and the actions performed on them.
//!
//! Actions granted on one resource are stored as an [`ActionSet`] bitfield.
//! `MANAGE` is a superset: a set containing it allows every action.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// Protected category of domain data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Users,
    Settings,
    Residents,
    Houses,
    Tasks,
    Services,
    Dashboard,
}

impl Resource {
    /// Returns all resources.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Users,
            Self::Settings,
            Self::Residents,
            Self::Houses,
            Self::Tasks,
            Self::Services,
            Self::Dashboard,
        ]
    }

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "USERS",
            Self::Settings => "SETTINGS",
            Self::Residents => "RESIDENTS",
            Self::Houses => "HOUSES",
            Self::Tasks => "TASKS",
            Self::Services => "SERVICES",
            Self::Dashboard => "DASHBOARD",
        }
    }

    /// Lowercase plural used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "user accounts",
            Self::Settings => "settings",
            Self::Residents => "residents",
            Self::Houses => "houses",
            Self::Tasks => "tasks",
            Self::Services => "services",
            Self::Dashboard => "the dashboard",
        }
    }

    /// Root page of the resource's screens. Every screen for the resource
    /// lives at this path or below it.
    #[must_use]
    pub const fn base_path(self) -> &'static str {
        match self {
            Self::Users => "/admin/users",
            Self::Settings => "/admin/settings",
            Self::Residents => "/residents",
            Self::Houses => "/houses",
            Self::Tasks => "/tasks",
            Self::Services => "/services",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Finds the resource whose screens contain `path`.
    ///
    /// Matches at a `/` boundary, so `/residentsx` belongs to no resource.
    #[must_use]
    pub fn for_path(path: &str) -> Option<Self> {
        Self::all().iter().copied().find(|resource| {
            let base = resource.base_path();
            path == base
                || path
                    .strip_prefix(base)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == normalized)
            .ok_or_else(|| ParseError::new("resource", s))
    }
}

/// Operation performed on a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    /// Superset of the four actions above.
    Manage,
}

impl Action {
    /// Returns all actions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::View,
            Self::Create,
            Self::Update,
            Self::Delete,
            Self::Manage,
        ]
    }

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Manage => "MANAGE",
        }
    }

    /// Single-bit set for this action.
    #[must_use]
    pub const fn flag(self) -> ActionSet {
        match self {
            Self::View => ActionSet::VIEW,
            Self::Create => ActionSet::CREATE,
            Self::Update => ActionSet::UPDATE,
            Self::Delete => ActionSet::DELETE,
            Self::Manage => ActionSet::MANAGE,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| ParseError::new("action", s))
    }
}

bitflags! {
    /// Actions granted on a single resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionSet: u8 {
        const VIEW   = 1 << 0;
        const CREATE = 1 << 1;
        const UPDATE = 1 << 2;
        const DELETE = 1 << 3;
        const MANAGE = 1 << 4;
    }
}

impl ActionSet {
    /// View, create, update and delete, without `MANAGE`.
    pub const CRUD: Self = Self::VIEW
        .union(Self::CREATE)
        .union(Self::UPDATE)
        .union(Self::DELETE);

    /// Expands `MANAGE` into every action it implies.
    #[must_use]
    pub const fn effective(self) -> Self {
        if self.contains(Self::MANAGE) {
            Self::all()
        } else {
            self
        }
    }

    /// Check whether `action` is allowed by this set, honoring `MANAGE`.
    ///
    /// # Examples
    ///
    /// ```
    /// use home21_server::permissions::{Action, ActionSet};
    ///
    /// assert!(ActionSet::MANAGE.allows(Action::Delete));
    /// assert!(!ActionSet::VIEW.allows(Action::Update));
    /// ```
    #[must_use]
    pub const fn allows(self, action: Action) -> bool {
        self.effective().contains(action.flag())
    }

    /// Lists the actions in this set in declaration order.
    #[must_use]
    pub fn actions(self) -> Vec<Action> {
        Action::all()
            .iter()
            .copied()
            .filter(|action| self.contains(action.flag()))
            .collect()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, action| set | action.flag())
    }
}
