use super::*;

/// # Safety
/// Env mutation is process-global; every test here that touches it holds
/// `ENV_LOCK` for its whole body.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("HIREVEU_API_BASE_URL");
        std::env::remove_var("HIREVEU_GOOGLE_CLIENT_ID");
        std::env::remove_var("HIREVEU_AUTH_THROTTLE_SECS");
        std::env::remove_var("HIREVEU_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("HIREVEU_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("HIREVEU_STORAGE_PATH");
    }
}

static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_client_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.auth_throttle, Duration::from_secs(5));
    assert!(cfg.google_client_id.is_none());
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("HIREVEU_API_BASE_URL", "https://api.example.test/v1/");
        std::env::set_var("HIREVEU_GOOGLE_CLIENT_ID", "client-123.apps.googleusercontent.com");
        std::env::set_var("HIREVEU_AUTH_THROTTLE_SECS", "12");
        std::env::set_var("HIREVEU_REQUEST_TIMEOUT_SECS", "45");
        std::env::set_var("HIREVEU_CONNECT_TIMEOUT_SECS", "3");
        std::env::set_var("HIREVEU_STORAGE_PATH", "/tmp/hv.json");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_base_url, "https://api.example.test/v1");
    assert_eq!(cfg.google_client_id.as_deref(), Some("client-123.apps.googleusercontent.com"));
    assert_eq!(cfg.auth_throttle, Duration::from_secs(12));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 45, connect_secs: 3 });
    assert_eq!(cfg.storage_path, PathBuf::from("/tmp/hv.json"));

    unsafe { clear_client_env() };
}

#[test]
fn from_env_invalid_numbers_fall_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("HIREVEU_AUTH_THROTTLE_SECS", "soon");
        std::env::set_var("HIREVEU_REQUEST_TIMEOUT_SECS", "-1");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.auth_throttle, Duration::from_secs(DEFAULT_AUTH_THROTTLE_SECS));
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_client_env() };
}

#[test]
fn from_env_blank_google_client_id_is_none() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("HIREVEU_GOOGLE_CLIENT_ID", "  ");
    }

    assert!(ClientConfig::from_env().unwrap().google_client_id.is_none());

    unsafe { clear_client_env() };
}

#[test]
fn from_env_rejects_bad_base_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_client_env();
        std::env::set_var("HIREVEU_API_BASE_URL", "not a url");
    }

    assert!(matches!(ClientConfig::from_env(), Err(ConfigError::InvalidBaseUrl { .. })));

    unsafe { clear_client_env() };
}

#[test]
fn normalize_base_url_rejects_non_http_scheme() {
    let err = normalize_base_url("ftp://files.example.test").unwrap_err();
    assert!(err.to_string().contains("unsupported scheme 'ftp'"));
}

#[test]
fn with_base_url_trims_trailing_slashes() {
    let cfg = ClientConfig::default().with_base_url("http://127.0.0.1:9000//").unwrap();
    assert_eq!(cfg.api_base_url, "http://127.0.0.1:9000");
}
