//! User roles and their privilege ranking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// Privilege level assigned to an actor.
///
/// Variants are declared in rank order, so the derived `Ord` is the
/// privilege order: `Guest < Resident < Encadrant < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Unauthenticated visitor. Never stored on an account.
    Guest,
    /// Person living in a Home21 house
    Resident,
    /// Supervisor in charge of residents and houses
    Encadrant,
    /// Facility administrator
    Admin,
    /// Platform owner
    SuperAdmin,
}

impl Role {
    /// Returns all roles, lowest rank first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Guest,
            Self::Resident,
            Self::Encadrant,
            Self::Admin,
            Self::SuperAdmin,
        ]
    }

    /// Roles that may be stored on a user account.
    #[must_use]
    pub const fn assignable() -> &'static [Self] {
        &[Self::Resident, Self::Encadrant, Self::Admin, Self::SuperAdmin]
    }

    /// Resolves a nullable role: no session means `Guest`.
    #[must_use]
    pub fn or_guest(role: Option<Self>) -> Self {
        role.unwrap_or(Self::Guest)
    }

    /// Position in the privilege order (0 = `Guest`).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Guest => 0,
            Self::Resident => 1,
            Self::Encadrant => 2,
            Self::Admin => 3,
            Self::SuperAdmin => 4,
        }
    }

    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Resident => "RESIDENT",
            Self::Encadrant => "ENCADRANT",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Name shown in the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Guest => "Guest",
            Self::Resident => "Resident",
            Self::Encadrant => "Encadrant",
            Self::Admin => "Administrator",
            Self::SuperAdmin => "Super administrator",
        }
    }

    /// Short description shown next to the role picker.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Guest => "Not signed in",
            Self::Resident => "Lives in a house and requests services",
            Self::Encadrant => "Supervises residents, tasks and services",
            Self::Admin => "Manages users, houses and facility settings",
            Self::SuperAdmin => "Full platform access, including administrators",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| ParseError::new("role", s))
    }
}
