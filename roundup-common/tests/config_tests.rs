//! Configuration loading and graceful degradation
//!
//! Tests that manipulate ROUNDUP_CONFIG are marked with #[serial] so they
//! do not race each other on the process environment.

use roundup_common::config::{
    load_toml_config, resolve_config_path, TomlConfig, CONFIG_PATH_ENV, DEFAULT_PORT,
};
use roundup_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_no_path_uses_defaults() {
    let config = load_toml_config(None).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn test_full_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host = "127.0.0.1"
port = 4100
airtable_api_url = "http://localhost:9001/v0"
mailersend_api_url = "http://localhost:9002/v1/email"
sender_name = "Acme Hiring"
request_timeout_secs = 5
email_log_capacity = 20

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 4100);
    assert_eq!(config.airtable_api_url, "http://localhost:9001/v0");
    assert_eq!(config.mailersend_api_url, "http://localhost:9002/v1/email");
    assert_eq!(config.sender_name, "Acme Hiring");
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.email_log_capacity, 20);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let result = load_toml_config(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_values_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "request_timeout_secs = 0").unwrap();

    assert!(load_toml_config(Some(file.path())).is_err());
}

#[test]
#[serial]
fn test_env_var_selects_config_file() {
    let path = "/tmp/roundup-env-config.toml";
    env::set_var(CONFIG_PATH_ENV, path);

    let resolved = resolve_config_path(None);
    env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(resolved, Some(PathBuf::from(path)));
}

#[test]
#[serial]
fn test_cli_path_beats_env_var() {
    env::set_var(CONFIG_PATH_ENV, "/tmp/from-env.toml");
    let cli = PathBuf::from("/tmp/from-cli.toml");

    let resolved = resolve_config_path(Some(&cli));
    env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(resolved, Some(cli));
}

#[test]
#[serial]
fn test_blank_env_var_falls_back_to_default_location() {
    env::set_var(CONFIG_PATH_ENV, "  ");

    let resolved = resolve_config_path(None);
    env::remove_var(CONFIG_PATH_ENV);

    if let Some(path) = resolved {
        assert!(path.ends_with("roundup/config.toml"));
    }
}
