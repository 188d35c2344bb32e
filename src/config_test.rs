#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: [&str; 6] = [
    "BOXMARK_API_URL",
    "BOXMARK_VIEWPORT_WIDTH",
    "BOXMARK_VIEWPORT_HEIGHT",
    "BOXMARK_DEFAULT_LABEL",
    "BOXMARK_REQUEST_TIMEOUT_SECS",
    "BOXMARK_CONNECT_TIMEOUT_SECS",
];

/// # Safety
/// Callers hold `ENV_LOCK` so no other test in this module touches the environment concurrently.
unsafe fn clear_boxmark_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_returns_default_when_unset() {
    let val: u64 = env_parse("BOXMARK_TEST_UNSET_VAR_a8f3", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_reads_valid_value() {
    unsafe { std::env::set_var("BOXMARK_TEST_VALID_b7e2", "1234.5") };
    let val: f64 = env_parse("BOXMARK_TEST_VALID_b7e2", 0.0);
    assert_eq!(val, 1234.5);
    unsafe { std::env::remove_var("BOXMARK_TEST_VALID_b7e2") };
}

#[test]
fn env_parse_returns_default_on_invalid() {
    unsafe { std::env::set_var("BOXMARK_TEST_INVALID_c9d1", "not_a_number") };
    let val: u64 = env_parse("BOXMARK_TEST_INVALID_c9d1", 99);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("BOXMARK_TEST_INVALID_c9d1") };
}

// =============================================================================
// from_env
// =============================================================================

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { clear_boxmark_env() };

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.viewport, Size::new(1280.0, 720.0));
    assert_eq!(cfg.default_label, "object");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 120, connect_secs: 10 });
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_boxmark_env();
        std::env::set_var("BOXMARK_API_URL", "http://annotator.test:9000/");
        std::env::set_var("BOXMARK_VIEWPORT_WIDTH", "800");
        std::env::set_var("BOXMARK_VIEWPORT_HEIGHT", "600");
        std::env::set_var("BOXMARK_DEFAULT_LABEL", "car");
        std::env::set_var("BOXMARK_REQUEST_TIMEOUT_SECS", "30");
        std::env::set_var("BOXMARK_CONNECT_TIMEOUT_SECS", "3");
    }

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.api_url, "http://annotator.test:9000");
    assert_eq!(cfg.viewport, Size::new(800.0, 600.0));
    assert_eq!(cfg.default_label, "car");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 30, connect_secs: 3 });

    unsafe { clear_boxmark_env() };
}

#[test]
fn from_env_invalid_numbers_fall_back() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_boxmark_env();
        std::env::set_var("BOXMARK_VIEWPORT_WIDTH", "wide");
        std::env::set_var("BOXMARK_REQUEST_TIMEOUT_SECS", "-5");
    }

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.viewport.width, DEFAULT_VIEWPORT_WIDTH);
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_boxmark_env() };
}

#[test]
fn from_env_empty_url_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_boxmark_env();
        std::env::set_var("BOXMARK_API_URL", "/");
    }

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyApiUrl));

    unsafe { clear_boxmark_env() };
}

#[test]
fn from_env_zero_viewport_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_boxmark_env();
        std::env::set_var("BOXMARK_VIEWPORT_HEIGHT", "0");
    }

    let err = Config::from_env().unwrap_err().to_string();
    assert!(err.contains("viewport must be positive"));

    unsafe { clear_boxmark_env() };
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn validate_rejects_nan_viewport() {
    let cfg = Config { viewport: Size::new(f64::NAN, 10.0), ..Config::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::InvalidViewport { .. })));
}

#[test]
fn validate_accepts_defaults() {
    assert!(Config::default().validate().is_ok());
}
