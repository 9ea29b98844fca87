//! Configuration resolution tests
//!
//! Tests that touch PARL_DATA_ROOT or PARL_PORT are marked #[serial] so they
//! never observe each other's environment changes.

use std::env;
use std::io::Write;

use parl_common::config::{
    ConfigOverrides, TomlConfig, ViewerConfig, DATA_ROOT_ENV, DEFAULT_DATA_ROOT,
    DEFAULT_DETAILS_DIR, DEFAULT_LIST_FILE, DEFAULT_PORT, PORT_ENV,
};
use serial_test::serial;

fn clear_env() {
    env::remove_var(DATA_ROOT_ENV);
    env::remove_var(PORT_ENV);
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();
    let config = ViewerConfig::resolve(&TomlConfig::default(), &ConfigOverrides::default())
        .expect("defaults resolve");

    assert_eq!(config.data_root, DEFAULT_DATA_ROOT);
    assert_eq!(config.list_file, DEFAULT_LIST_FILE);
    assert_eq!(config.details_dir, DEFAULT_DETAILS_DIR);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_values_apply() {
    clear_env();
    let file = write_config(
        r#"
        data_root = "http://data.example/output"
        details_dir = "fiches"
        port = 6001

        [logging]
        level = "debug"
        "#,
    );
    let toml_config = TomlConfig::load(file.path()).expect("load toml");
    let config = ViewerConfig::resolve(&toml_config, &ConfigOverrides::default()).unwrap();

    assert_eq!(config.data_root, "http://data.example/output/");
    assert_eq!(config.details_dir, "fiches/");
    assert_eq!(config.port, 6001);
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_env_beats_toml() {
    clear_env();
    env::set_var(DATA_ROOT_ENV, "http://env.example/out/");
    env::set_var(PORT_ENV, "7002");

    let toml_config = TomlConfig {
        data_root: Some("http://toml.example/out/".to_string()),
        port: Some(6001),
        ..Default::default()
    };
    let config = ViewerConfig::resolve(&toml_config, &ConfigOverrides::default()).unwrap();
    clear_env();

    assert_eq!(config.data_root, "http://env.example/out/");
    assert_eq!(config.port, 7002);
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env();
    env::set_var(DATA_ROOT_ENV, "http://env.example/out/");

    let overrides = ConfigOverrides {
        data_root: Some("http://cli.example/out".to_string()),
        port: Some(9000),
        bind: Some("0.0.0.0".to_string()),
    };
    let config = ViewerConfig::resolve(&TomlConfig::default(), &overrides).unwrap();
    clear_env();

    assert_eq!(config.data_root, "http://cli.example/out/");
    assert_eq!(config.port, 9000);
    assert_eq!(config.bind, "0.0.0.0");
}

#[test]
#[serial]
fn test_invalid_port_env_is_config_error() {
    clear_env();
    env::set_var(PORT_ENV, "not-a-port");
    let result = ViewerConfig::resolve(&TomlConfig::default(), &ConfigOverrides::default());
    clear_env();

    let err = result.expect_err("bad port must fail");
    assert!(err.to_string().contains("PARL_PORT"));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let result = TomlConfig::discover(Some(std::path::Path::new(
        "/nonexistent/parl-viewer/config.toml",
    )));
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_is_error() {
    let file = write_config("port = \"not a number\"");
    let err = TomlConfig::load(file.path()).expect_err("type mismatch");
    assert!(err.to_string().contains("Parse"));
}
