use std::io::Write;
use std::sync::Arc;

use policyscope::{
    IdentityFolding, InMemoryPolicySource, PolicyId, ResolveConfig, Resolver, SettingContext,
    SourceError, WarningKind,
};

const FIXTURE: &str = r#"{
  "scopes": {
    "OU=Lab,DC=corp,DC=example": [
      { "policy_id": "{6AC1786C}", "display_name": "Default Domain Policy", "enforced": true, "precedence_rank": 3 },
      { "policy_id": "{31B2F340}", "display_name": "Lab Baseline", "precedence_rank": 1 },
      { "policy_id": "{9F0E1D2C}", "display_name": "Kiosk Lockdown", "precedence_rank": 2 },
      { "policy_id": "{DEADBEEF}", "display_name": "Retired", "enabled": false, "precedence_rank": 0 }
    ]
  },
  "policies": {
    "{6AC1786C}": [
      { "context": "Computer", "key_path": "HKLM\\Software\\Policies\\Microsoft\\Windows Defender", "value_name": "DisableAntiSpyware", "data_type": "REG_DWORD", "value": 0 },
      { "context": "User", "key_path": "HKCU\\Control Panel\\Desktop", "value_name": "ScreenSaveTimeOut", "data_type": "REG_SZ", "value": "900" }
    ],
    "{31B2F340}": [
      { "context": "Computer", "key_path": "HKLM\\SOFTWARE\\Policies\\Microsoft\\Windows Defender", "value_name": "DisableAntiSpyware", "data_type": "REG_DWORD", "value": 1 },
      { "context": "User", "key_path": "HKCU\\Control Panel\\Desktop", "value_name": "ScreenSaveTimeOut", "data_type": "REG_SZ", "value": "900" }
    ],
    "{9F0E1D2C}": [
      { "context": "User", "key_path": "HKCU\\Control Panel\\Desktop", "value_name": "ScreenSaveTimeOut", "data_type": "REG_SZ", "value": "60" },
      { "context": "Site", "key_path": "HKLM\\Nowhere", "value_name": "X", "value": "1" }
    ],
    "{DEADBEEF}": [
      { "context": "User", "key_path": "HKCU\\Control Panel\\Desktop", "value_name": "ScreenSaveTimeOut", "data_type": "REG_SZ", "value": "1" }
    ]
  }
}"#;

const SCOPE: &str = "OU=Lab,DC=corp,DC=example";

fn resolver_from_file() -> Resolver {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();
    let source = InMemoryPolicySource::from_json_file(file.path()).unwrap();
    Resolver::new(Arc::new(source))
}

#[test]
fn exact_identity_keeps_case_variants_apart() {
    let report = resolver_from_file()
        .resolve(SCOPE, &ResolveConfig::default())
        .unwrap();

    // Kiosk Lockdown has a setting with an unknown context and is skipped entirely,
    // leaving the two 900s in agreement; the two Defender keys differ in case only.
    assert!(report.is_empty());
    assert_eq!(report.links_analyzed, 3);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].policy_id, PolicyId::new("{9F0E1D2C}"));
    assert!(matches!(report.warnings[0].kind, WarningKind::UnknownContext { .. }));
}

#[test]
fn case_insensitive_identity_groups_registry_paths() {
    let config = ResolveConfig::builder()
        .identity_folding(IdentityFolding::AsciiCaseInsensitive)
        .build()
        .unwrap();
    let report = resolver_from_file().resolve(SCOPE, &config).unwrap();

    assert_eq!(report.group_count(), 1);
    assert_eq!(report.len(), 2);
    let winner = &report.records[0];
    assert_eq!(winner.context, SettingContext::Machine);
    assert_eq!(winner.display_name, "Lab Baseline");
    assert_eq!(winner.value, "1");
    assert!(!winner.is_conflicting);

    let overridden = &report.records[1];
    assert_eq!(overridden.display_name, "Default Domain Policy");
    assert!(overridden.enforced);
    assert_eq!(overridden.winning_value, "1");
    assert!(overridden.is_conflicting);
}

#[test]
fn key_filter_limits_analysis() {
    let config = ResolveConfig::builder()
        .identity_folding(IdentityFolding::AsciiCaseInsensitive)
        .key_filter(r"^HKCU\\")
        .build()
        .unwrap();
    let report = resolver_from_file().resolve(SCOPE, &config).unwrap();
    assert!(report.is_empty());
}

#[test]
fn key_filter_matches_every_spelling_of_a_folded_key() {
    // The two Defender keys differ only in case ("Software" vs "SOFTWARE").
    let config = ResolveConfig::builder()
        .identity_folding(IdentityFolding::AsciiCaseInsensitive)
        .key_filter(r"^HKLM\\Software\\Policies")
        .build()
        .unwrap();
    let report = resolver_from_file().resolve(SCOPE, &config).unwrap();

    assert_eq!(report.group_count(), 1);
    assert_eq!(report.len(), 2);
    assert_eq!(report.records[0].policy_id, PolicyId::new("{31B2F340}"));
    assert_eq!(report.records[1].policy_id, PolicyId::new("{6AC1786C}"));
    assert!(report.records[1].is_conflicting);
}

#[test]
fn report_serializes_for_tabular_callers() {
    let config = ResolveConfig::builder()
        .identity_folding(IdentityFolding::AsciiCaseInsensitive)
        .build()
        .unwrap();
    let report = resolver_from_file().resolve(SCOPE, &config).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["scope"], SCOPE);
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["context"], "machine");
    assert_eq!(records[0]["winning_policy_id"], "{31B2F340}");
    assert_eq!(json["warnings"][0]["kind"], "unknown_context");
}

#[test]
fn missing_fixture_file_is_backend_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = InMemoryPolicySource::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SourceError::Backend { .. }));
}

#[test]
fn unnamed_links_report_their_policy_id() {
    let json = r#"{
      "scopes": { "OU=Plain": [
        { "policy_id": "{AAAA0001}", "precedence_rank": 1 },
        { "policy_id": "{AAAA0002}", "display_name": "  ", "precedence_rank": 2 }
      ] },
      "policies": {
        "{AAAA0001}": [ { "context": "machine", "key_path": "K", "value_name": "V", "value": "1" } ],
        "{AAAA0002}": [ { "context": "machine", "key_path": "K", "value_name": "V", "value": "2" } ]
      }
    }"#;
    let source = InMemoryPolicySource::from_json(json).unwrap();
    let report = Resolver::new(Arc::new(source))
        .resolve("OU=Plain", &ResolveConfig::default())
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.records[0].display_name, "{AAAA0001}");
    assert_eq!(report.records[1].display_name, "{AAAA0002}");
}
