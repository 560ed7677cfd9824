//! Unit tests for configuration resolution
//!
//! Covers the priority order (CLI > environment > config file > default)
//! and bind-address validation.
//!
//! Note: tests that manipulate IDR_ROOT_FOLDER or IDR_BIND are marked with
//! #[serial] to prevent environment variable race conditions.

use idr_common::config::{self, DEFAULT_BIND, DEFAULT_MAX_LOCK_WAIT_MS};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn no_overrides_uses_defaults() {
    env::remove_var(config::ROOT_FOLDER_ENV);
    env::remove_var(config::BIND_ENV);

    let cfg = config::resolve_config(None, None).unwrap();

    assert!(!cfg.root_folder.as_os_str().is_empty());
    assert_eq!(cfg.bind.to_string(), DEFAULT_BIND);
    assert_eq!(cfg.max_lock_wait_ms, DEFAULT_MAX_LOCK_WAIT_MS);
}

#[test]
#[serial]
fn env_var_overrides_default_root() {
    let test_path = "/tmp/idr-test-env-folder";
    env::set_var(config::ROOT_FOLDER_ENV, test_path);

    let cfg = config::resolve_config(None, None).unwrap();
    assert_eq!(cfg.root_folder, PathBuf::from(test_path));

    env::remove_var(config::ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn cli_argument_beats_env_var() {
    env::set_var(config::ROOT_FOLDER_ENV, "/tmp/idr-test-env-folder");

    let cfg = config::resolve_config(Some("/tmp/idr-test-cli-folder"), None).unwrap();
    assert_eq!(cfg.root_folder, PathBuf::from("/tmp/idr-test-cli-folder"));

    env::remove_var(config::ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn cli_bind_beats_env_bind() {
    env::set_var(config::BIND_ENV, "127.0.0.1:4000");

    let cfg = config::resolve_config(None, Some("127.0.0.1:5000")).unwrap();
    assert_eq!(cfg.bind.to_string(), "127.0.0.1:5000");

    env::remove_var(config::BIND_ENV);
}

#[test]
#[serial]
fn invalid_bind_address_is_rejected() {
    env::remove_var(config::BIND_ENV);

    let result = config::resolve_config(None, Some("not-an-address"));
    assert!(result.is_err());
}

#[test]
fn database_path_is_inside_root_folder() {
    let cfg = config::resolve_config(Some("/tmp/idr-test-db-path"), None).unwrap();
    assert_eq!(
        cfg.database_path(),
        PathBuf::from("/tmp/idr-test-db-path/idr.db")
    );
}
