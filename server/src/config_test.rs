use super::*;

/// # Safety
/// Env mutation is process-wide; keep every env assertion in one test.
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("PORT");
        std::env::remove_var("TABLES_DIR");
    }
}

#[test]
fn from_env_defaults_overrides_and_bad_port() {
    unsafe { clear_server_env() };

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.tables_dir, PathBuf::from(DEFAULT_TABLES_DIR));
    assert_eq!(cfg.listen_addr(), "0.0.0.0:5000");

    unsafe {
        std::env::set_var("BIND_ADDR", "127.0.0.1");
        std::env::set_var("PORT", "8080");
        std::env::set_var("TABLES_DIR", "/srv/tables");
    }

    let cfg = ServerConfig::from_env().unwrap();
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    assert_eq!(cfg.tables_dir, PathBuf::from("/srv/tables"));

    unsafe { std::env::set_var("PORT", "not-a-port") };
    let err = ServerConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("invalid PORT"));

    unsafe { clear_server_env() };
}
