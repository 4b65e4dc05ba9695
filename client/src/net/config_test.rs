use super::*;

/// # Safety
/// Env mutation is process-wide; keep every env assertion in one test.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("TABLES_BASE_URL");
        std::env::remove_var("TABLES_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("TABLES_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults_and_overrides() {
    unsafe { clear_client_env() };
    assert_eq!(ClientConfig::from_env(), ClientConfig::default());

    unsafe {
        std::env::set_var("TABLES_BASE_URL", "http://tables.local:8080/");
        std::env::set_var("TABLES_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("TABLES_CONNECT_TIMEOUT_SECS", "soon");
    }
    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.base_url, "http://tables.local:8080");
    assert_eq!(cfg.request_timeout_secs, 5);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);

    unsafe { clear_client_env() };
}
