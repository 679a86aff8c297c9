//! Tests for sandbox configuration loading.

extern crate toolpad_eval;

use std::fs;
use std::path::Path;

use toolpad_eval::runner::plugin::config::{
    ConfigError, SandboxConfig, DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING_LENGTH,
};

#[test]
fn test_empty_config_uses_defaults() {
    let config = SandboxConfig::parse("").unwrap();
    assert_eq!(config, SandboxConfig::default());
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert!(config.console_enabled);
    assert_eq!(config.max_string_length, DEFAULT_MAX_STRING_LENGTH);
    assert_eq!(config.max_array_length, DEFAULT_MAX_ARRAY_LENGTH);
}

#[test]
fn test_full_config() {
    let config = SandboxConfig::parse(
        r#"
        max_depth = 16
        console_enabled = false
        disabled_globals = ["console", "JSON"]
        denied_globals = ["Intl"]
        max_string_length = 1024
        max_array_length = 64
        "#,
    )
    .unwrap();
    assert_eq!(config.max_depth, 16);
    assert!(!config.console_enabled);
    assert_eq!(config.disabled_globals, vec!["console", "JSON"]);
    assert_eq!(config.denied_globals, vec!["Intl"]);
    assert_eq!(config.max_string_length, 1024);
    assert_eq!(config.max_array_length, 64);
}

#[test]
fn test_unknown_keys_are_rejected() {
    let err = SandboxConfig::parse("max_dpeth = 3").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_depth_is_invalid() {
    let err = SandboxConfig::parse("max_depth = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert_eq!(
        err.to_string(),
        "Invalid sandbox config: max_depth must be greater than zero"
    );
}

#[test]
fn test_zero_length_caps_are_invalid() {
    let err = SandboxConfig::parse("max_string_length = 0").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid sandbox config: max_string_length must be greater than zero"
    );
    let err = SandboxConfig::parse("max_array_length = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_array_cap_never_exceeds_u32() {
    let config = SandboxConfig::parse("max_array_length = 10_000_000_000").unwrap();
    assert_eq!(config.array_length_limit(), u32::MAX as usize);
    assert_eq!(SandboxConfig::default().array_length_limit(), DEFAULT_MAX_ARRAY_LENGTH);
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("toolpad-eval-{}.toml", uuid::Uuid::new_v4()));
    fs::write(&path, "max_depth = 8\n").unwrap();
    let config = SandboxConfig::load(&path);
    fs::remove_file(&path).unwrap();
    assert_eq!(config.unwrap().max_depth, 8);
}

#[test]
fn test_missing_file() {
    let err = SandboxConfig::load(Path::new("/nonexistent/toolpad-eval.toml")).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert_eq!(path, Path::new("/nonexistent/toolpad-eval.toml")),
        other => panic!("unexpected {:?}", other),
    }
}
