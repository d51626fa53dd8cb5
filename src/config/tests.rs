use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::Settings;
use super::{load_config, load_config_from, validate};
use crate::utils::error::RelayError;

const ENV_KEYS: [&str; 5] = [
    "NAVRELAY_SOURCE__DEVICE_PATH",
    "NAVRELAY_SERVER__HOST",
    "NAVRELAY_SERVER__PORT",
    "NAVRELAY_BROKER__QUEUE_CAPACITY",
    "NAVRELAY_LOG__LEVEL",
];

fn without_env<R>(f: impl FnOnce() -> R) -> R {
    temp_env::with_vars_unset(ENV_KEYS, f)
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.source.device_path, PathBuf::from("/dev/ttyACM0"));
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 2000);
    assert_eq!(settings.broker.queue_capacity, 5);
    assert_eq!(settings.log.level, "info");
    assert_eq!(settings.listen_addr(), "0.0.0.0:2000");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = std::env::current_dir().expect("current_dir");
    std::env::set_current_dir(tmp.path()).expect("set current dir");

    let cfg = without_env(load_config);

    std::env::set_current_dir(orig).expect("restore cwd");
    assert_eq!(cfg.expect("load_config failed"), Settings::default());
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // Create a temporary directory and set it as current dir so load_config
    // will pick up config/default.toml from there.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = std::env::current_dir().expect("current_dir");
    std::env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [source]
        device_path = "/dev/ttyUSB1"

        [server]
        port = 10110

        [broker]
        queue_capacity = 16
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = without_env(load_config);

    // restore cwd
    std::env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.source.device_path, PathBuf::from("/dev/ttyUSB1"));
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 10110);
    assert_eq!(cfg.broker.queue_capacity, 16);
    assert_eq!(cfg.log.level, "info");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("relay.toml");
    fs::write(&path, "[server]\nport = 3000\n").expect("write config file");

    let cfg = temp_env::with_vars(
        [
            ("NAVRELAY_SERVER__PORT", Some("4000")),
            ("NAVRELAY_BROKER__QUEUE_CAPACITY", Some("8")),
            ("NAVRELAY_LOG__LEVEL", Some("debug")),
        ],
        || load_config_from(Some(&path)),
    )
    .expect("load_config_from failed");

    assert_eq!(cfg.server.port, 4000);
    assert_eq!(cfg.broker.queue_capacity, 8);
    assert_eq!(cfg.log.level, "debug");
}

#[test]
#[serial]
fn explicit_config_file_must_exist() {
    let tmp = TempDir::new().expect("create tempdir");
    let missing = tmp.path().join("missing.toml");
    let res = without_env(|| load_config_from(Some(&missing)));
    assert!(matches!(res, Err(RelayError::Config(_))));
}

#[test]
#[serial]
fn zero_queue_capacity_is_rejected() {
    let res = temp_env::with_vars(
        [("NAVRELAY_BROKER__QUEUE_CAPACITY", Some("0"))],
        || load_config_from(None),
    );
    assert!(matches!(res, Err(RelayError::InvalidConfig(_))));
}

#[test]
fn empty_device_path_is_rejected() {
    let mut settings = Settings::default();
    settings.source.device_path = PathBuf::new();
    assert!(matches!(
        validate(&settings),
        Err(RelayError::InvalidConfig(_))
    ));
}

#[test]
#[serial]
fn read_settings_leaves_validation_to_caller() {
    let cfg = temp_env::with_vars(
        [("NAVRELAY_BROKER__QUEUE_CAPACITY", Some("0"))],
        || super::read_settings(None),
    )
    .expect("read_settings failed");
    assert_eq!(cfg.broker.queue_capacity, 0);
}
