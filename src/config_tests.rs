use crate::config::{Config, Mode};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const MANAGED_VARS: &[&str] = &[
    "MODE",
    "OANDA_API_KEY",
    "OANDA_ACCOUNT_ID",
    "BRAVE_NEWS_COUNT",
    "ANTHROPIC_MAX_TOKENS",
    "ANTHROPIC_TEMPERATURE",
    "HTTP_TIMEOUT_SECS",
    "HTTP_MAX_RETRIES",
    "DATABASE_URL",
];

fn clear_env() {
    for var in MANAGED_VARS {
        // SAFETY: guarded by ENV_LOCK
        unsafe { env::remove_var(var) };
    }
}

fn set(var: &str, value: &str) {
    // SAFETY: guarded by ENV_LOCK
    unsafe { env::set_var(var, value) };
}

#[test]
fn test_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.mode, Mode::Mock);
    assert_eq!(config.http.timeout, Duration::from_secs(30));
    assert_eq!(config.http.max_retries, 3);
    assert_eq!(config.anthropic.max_tokens, 2000);
    assert!((config.anthropic.temperature - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.brave.news_count, 10);
    assert_eq!(config.persistence.database_url, "sqlite://fxdesk.db");
}

#[test]
fn test_invalid_mode_is_rejected() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("MODE", "alpaca");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("Invalid MODE"));

    clear_env();
}

#[test]
fn test_oanda_mode_requires_credentials() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("MODE", "oanda");

    assert!(Config::from_env().is_err());

    set("OANDA_API_KEY", "token");
    set("OANDA_ACCOUNT_ID", "101-004-1234567-001");
    let config = Config::from_env().unwrap();
    assert_eq!(config.mode, Mode::Oanda);

    clear_env();
}

#[test]
fn test_numeric_parse_errors_name_the_variable() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();
    set("HTTP_MAX_RETRIES", "many");

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("HTTP_MAX_RETRIES"));

    clear_env();
    set("HTTP_TIMEOUT_SECS", "0");
    assert!(Config::from_env().is_err());

    clear_env();
}
