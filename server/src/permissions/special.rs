//! Special permissions: named capabilities not tied to a resource/action pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// Named capability granted to a role independently of resource permissions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialPermission {
    /// Create accounts with the `SUPER_ADMIN` role
    CreateSuperAdmin,
    /// Change platform-wide settings (backend integration, feature switches)
    ManageSystemSettings,
    /// Read the audit log of every house
    ViewAllAuditLogs,
    /// Edit or remove administrator accounts
    ManageAdmins,
    /// Export resident and service data
    ExportData,
    /// Read occupancy and service reports
    ViewReports,
}

impl SpecialPermission {
    /// Returns all special permissions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CreateSuperAdmin,
            Self::ManageSystemSettings,
            Self::ViewAllAuditLogs,
            Self::ManageAdmins,
            Self::ExportData,
            Self::ViewReports,
        ]
    }

    /// Returns the canonical name, as used in rules files and audit entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use home21_server::permissions::SpecialPermission;
    ///
    /// assert_eq!(SpecialPermission::CreateSuperAdmin.name(), "CREATE_SUPER_ADMIN");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateSuperAdmin => "CREATE_SUPER_ADMIN",
            Self::ManageSystemSettings => "MANAGE_SYSTEM_SETTINGS",
            Self::ViewAllAuditLogs => "VIEW_ALL_AUDIT_LOGS",
            Self::ManageAdmins => "MANAGE_ADMINS",
            Self::ExportData => "EXPORT_DATA",
            Self::ViewReports => "VIEW_REPORTS",
        }
    }

    /// Returns a human-readable description of the permission.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CreateSuperAdmin => "Create super administrator accounts",
            Self::ManageSystemSettings => "Manage platform settings",
            Self::ViewAllAuditLogs => "View the audit log of every house",
            Self::ManageAdmins => "Edit and remove administrators",
            Self::ExportData => "Export resident and service data",
            Self::ViewReports => "View occupancy and service reports",
        }
    }
}

impl fmt::Display for SpecialPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecialPermission {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|perm| perm.name() == normalized)
            .ok_or_else(|| ParseError::new("special permission", s))
    }
}
