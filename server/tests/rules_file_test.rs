//! Loading rule tables from JSON files.

use std::fs;

use home21_server::permissions::{
    Action, Authorizer, PagePattern, Resource, Role, RuleError, RuleTable, SpecialPermission,
};
use tempfile::TempDir;

/// The stock table written out as a rules file.
const STOCK_RULES: &str = r#"{
  "roles": {
    "GUEST": { "pages": ["/", "/login", "/unauthorized"] },
    "RESIDENT": {
      "permissions": {
        "DASHBOARD": ["VIEW"],
        "SERVICES": ["VIEW", "CREATE"],
        "TASKS": ["VIEW"]
      },
      "pages": ["/", "/login", "/unauthorized", "/profile"]
    },
    "ENCADRANT": {
      "permissions": {
        "DASHBOARD": ["VIEW"],
        "USERS": ["VIEW"],
        "RESIDENTS": ["VIEW", "UPDATE"],
        "HOUSES": ["VIEW"],
        "TASKS": ["VIEW", "CREATE", "UPDATE"],
        "SERVICES": ["VIEW", "CREATE", "UPDATE"]
      },
      "pages": ["/", "/login", "/unauthorized", "/profile"],
      "special": ["VIEW_REPORTS"]
    },
    "ADMIN": {
      "permissions": {
        "DASHBOARD": ["VIEW"],
        "USERS": ["MANAGE"],
        "RESIDENTS": ["MANAGE"],
        "HOUSES": ["MANAGE"],
        "TASKS": ["MANAGE"],
        "SERVICES": ["MANAGE"],
        "SETTINGS": ["VIEW", "UPDATE"]
      },
      "pages": ["/", "/login", "/unauthorized", "/profile"],
      "special": ["VIEW_REPORTS", "EXPORT_DATA"]
    },
    "SUPER_ADMIN": {
      "permissions": {
        "USERS": ["MANAGE"],
        "SETTINGS": ["MANAGE"],
        "RESIDENTS": ["MANAGE"],
        "HOUSES": ["MANAGE"],
        "TASKS": ["MANAGE"],
        "SERVICES": ["MANAGE"],
        "DASHBOARD": ["MANAGE"]
      },
      "pages": ["/", "/login", "/unauthorized", "/profile", "*"],
      "special": [
        "CREATE_SUPER_ADMIN",
        "MANAGE_SYSTEM_SETTINGS",
        "VIEW_ALL_AUDIT_LOGS",
        "MANAGE_ADMINS",
        "EXPORT_DATA",
        "VIEW_REPORTS"
      ]
    }
  }
}"#;

fn write_rules(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("rules.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_stock_rules_file_matches_builtin_table() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(&dir, STOCK_RULES);

    let loaded = RuleTable::load(&path).unwrap();
    assert_eq!(loaded, RuleTable::default_table());
}

#[test]
fn test_loaded_rules_answer_queries() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(&dir, STOCK_RULES);
    let authz = Authorizer::new(RuleTable::load(&path).unwrap());

    assert!(!authz.has_permission(Some(Role::Encadrant), Resource::Residents, Action::Delete));
    assert!(authz.can_access_page(Some(Role::Encadrant), "/residents/42/edit"));
    assert!(authz.has_special(Some(Role::Admin), SpecialPermission::ExportData));
    assert!(!authz.has_special(Some(Role::Admin), SpecialPermission::CreateSuperAdmin));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = RuleTable::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, RuleError::Io(_)));
}

#[test]
fn test_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(&dir, "{ \"roles\": ");
    assert!(matches!(RuleTable::load(&path), Err(RuleError::Json(_))));
}

#[test]
fn test_unknown_names_are_rejected() {
    for body in [
        r#"{"roles": {"OWNER": {}}}"#,
        r#"{"roles": {"ADMIN": {"permissions": {"GARAGES": ["VIEW"]}}}}"#,
        r#"{"roles": {"ADMIN": {"permissions": {"HOUSES": ["ARCHIVE"]}}}}"#,
        r#"{"roles": {"ADMIN": {"special": ["DROP_DATABASE"]}}}"#,
    ] {
        let err = RuleTable::from_json(body).unwrap_err();
        assert!(matches!(err, RuleError::UnknownName(_)), "{body}: {err}");
    }
}

#[test]
fn test_bad_page_pattern_is_rejected() {
    let err = RuleTable::from_json(r#"{"roles": {"ADMIN": {"pages": ["/adm*n"]}}}"#).unwrap_err();
    assert!(matches!(err, RuleError::InvalidPagePattern(_)));
}

#[test]
fn test_roles_missing_from_file_get_nothing() {
    let table =
        RuleTable::from_json(r#"{"roles": {"ADMIN": {"permissions": {"HOUSES": ["VIEW"]}}}}"#)
            .unwrap();
    let authz = Authorizer::new(table);

    assert!(!authz.has_permission(Some(Role::Encadrant), Resource::Houses, Action::View));
    assert!(!authz.can_access_page(Some(Role::SuperAdmin), "/houses"));
    assert_eq!(
        authz.rules().rules(Role::Admin).page_access(),
        &[PagePattern::Prefix("/houses".into())]
    );
}

#[test]
fn test_non_monotonic_file_is_reported() {
    let table = RuleTable::from_json(
        r#"{"roles": {
            "ENCADRANT": {"permissions": {"RESIDENTS": ["DELETE"]}},
            "ADMIN": {"permissions": {"RESIDENTS": ["VIEW"]}},
            "SUPER_ADMIN": {"permissions": {"RESIDENTS": ["MANAGE"]}}
        }}"#,
    )
    .unwrap();

    let violations = table.monotonicity_violations();
    assert_eq!(
        violations,
        vec![
            "RESIDENT grants nothing beyond GUEST".to_string(),
            "ENCADRANT may DELETE RESIDENTS but ADMIN may not".to_string(),
        ]
    );
    assert!(matches!(
        table.validated(true),
        Err(RuleError::NotMonotonic(v)) if v.len() == 2
    ));
}

#[test]
fn test_sparse_file_with_equal_roles_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(
        &dir,
        r#"{"roles": {
            "ADMIN": {"permissions": {"HOUSES": ["VIEW"]}},
            "SUPER_ADMIN": {"permissions": {"HOUSES": ["MANAGE"]}, "pages": ["*"]}
        }}"#,
    );

    let table = RuleTable::load(&path).unwrap();
    assert_eq!(
        table.monotonicity_violations(),
        vec![
            "RESIDENT grants nothing beyond GUEST".to_string(),
            "ENCADRANT grants nothing beyond RESIDENT".to_string(),
        ]
    );
    assert!(matches!(
        table.validated(true),
        Err(RuleError::NotMonotonic(_))
    ));
}
