// Tests for audit configuration

use scuba_core::{AuditConfig, AuditError};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("scuba.json");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

// ============================================================================
// Default Tests
// ============================================================================

#[test]
fn test_default_config_is_valid() {
    let config = AuditConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_timeouts() {
    let config = AuditConfig::default();
    assert_eq!(config.seed_timeout(), Duration::from_secs(60));
    assert_eq!(config.navigation_timeout(), Duration::from_secs(20));
    assert_eq!(config.idle_timeout(), Duration::from_secs(10));
    assert_eq!(config.settle_delay(), Duration::from_secs(2));
}

#[test]
fn test_default_special_layouts() {
    let config = AuditConfig::default();
    assert_eq!(config.special_layout_paths, vec!["/book".to_string()]);
}

#[test]
fn test_default_selectors_start_with_site_convention() {
    let config = AuditConfig::default();
    assert_eq!(config.nav_selectors[0], ".navbar.navbar-expand-lg");
    assert_eq!(config.footer_selectors[0], "footer.main-footer");
}

// ============================================================================
// Special Layout Tests
// ============================================================================

#[test]
fn test_is_special_layout() {
    let config = AuditConfig::default();
    let book = Url::parse("https://www.example.com/book").unwrap();
    let nested = Url::parse("https://www.example.com/de/book?model=x").unwrap();
    let about = Url::parse("https://www.example.com/about").unwrap();

    assert!(config.is_special_layout(&book));
    assert!(config.is_special_layout(&nested));
    assert!(!config.is_special_layout(&about));
}

#[test]
fn test_query_does_not_trigger_special_layout() {
    let config = AuditConfig::default();
    let url = Url::parse("https://www.example.com/about?next=/book").unwrap();
    assert!(!config.is_special_layout(&url));
}

#[test]
fn test_empty_special_layout_entry_ignored() {
    let config = AuditConfig {
        special_layout_paths: vec![String::new()],
        ..AuditConfig::default()
    };
    let url = Url::parse("https://www.example.com/about").unwrap();
    assert!(!config.is_special_layout(&url));
}

// ============================================================================
// Allowlist Tests
// ============================================================================

#[test]
fn test_allowlist_defaults_to_seed_origin() {
    let config = AuditConfig::default();
    let seed = Url::parse("https://www.example.com/start").unwrap();

    let allowlist = config.allowlist(&seed).unwrap();
    assert_eq!(allowlist.origins(), vec!["https://www.example.com".to_string()]);
}

#[test]
fn test_allowlist_uses_configured_origins() {
    let config = AuditConfig {
        origins: vec!["https://www.example.com".to_string(), "https://shop.example.com".to_string()],
        ..AuditConfig::default()
    };
    let seed = Url::parse("https://www.example.com/").unwrap();

    let allowlist = config.allowlist(&seed).unwrap();
    assert_eq!(allowlist.origins().len(), 2);
    assert!(allowlist.contains(&Url::parse("https://shop.example.com/cart").unwrap()));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_rejects_empty_selector_list() {
    let config = AuditConfig {
        footer_link_selectors: vec!["  ".to_string()],
        ..AuditConfig::default()
    };
    match config.validate() {
        Err(AuditError::Config(message)) => assert!(message.contains("footer_link_selectors")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_validate_rejects_malformed_selector() {
    let config = AuditConfig {
        nav_selectors: vec![".navbar".to_string(), "nav[[".to_string()],
        ..AuditConfig::default()
    };
    match config.validate() {
        Err(AuditError::Config(message)) => assert!(message.starts_with("nav_selectors")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_validate_rejects_malformed_brand_selector() {
    let config = AuditConfig {
        brand_selectors: vec!["::".to_string()],
        ..AuditConfig::default()
    };
    assert!(matches!(config.validate(), Err(AuditError::Config(_))));
}

#[test]
fn test_load_rejects_malformed_selector() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, r#"{ "footer_selectors": ["footer[["] }"#);

    let result = AuditConfig::load(&path);
    assert!(matches!(result, Err(AuditError::Config(_))));
}

#[test]
fn test_validate_rejects_bad_origin() {
    let config = AuditConfig {
        origins: vec!["example.com".to_string()],
        ..AuditConfig::default()
    };
    assert!(matches!(config.validate(), Err(AuditError::Config(_))));
}

#[test]
fn test_validate_rejects_zero_navigation_timeout() {
    let config = AuditConfig {
        navigation_timeout_ms: 0,
        ..AuditConfig::default()
    };
    assert!(matches!(config.validate(), Err(AuditError::Config(_))));
}

#[test]
fn test_zero_idle_and_settle_are_allowed() {
    let config = AuditConfig {
        idle_timeout_ms: 0,
        settle_delay_ms: 0,
        ..AuditConfig::default()
    };
    assert!(config.validate().is_ok());
}

// ============================================================================
// Loading Tests
// ============================================================================

#[test]
fn test_load_partial_config_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"{ "origins": ["https://www.example.com"], "settle_delay_ms": 500 }"#,
    );

    let config = AuditConfig::load(&path).unwrap();
    assert_eq!(config.origins, vec!["https://www.example.com".to_string()]);
    assert_eq!(config.settle_delay(), Duration::from_millis(500));
    assert_eq!(config.nav_selectors, AuditConfig::default().nav_selectors);
}

#[test]
fn test_load_round_trips_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let original = AuditConfig {
        special_layout_paths: vec!["/book".to_string(), "/landing".to_string()],
        ..AuditConfig::default()
    };
    let path = write_config(&temp_dir, &original.to_json().unwrap());

    let loaded = AuditConfig::load(&path).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_load_missing_file() {
    let result = AuditConfig::load("/nonexistent/scuba.json");
    assert!(matches!(result, Err(AuditError::Io(_))));
}

#[test]
fn test_load_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "{ not json");

    let result = AuditConfig::load(&path);
    assert!(matches!(result, Err(AuditError::Json(_))));
}

#[test]
fn test_load_validates() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, r#"{ "nav_selectors": [] }"#);

    let result = AuditConfig::load(&path);
    assert!(matches!(result, Err(AuditError::Config(_))));
}
