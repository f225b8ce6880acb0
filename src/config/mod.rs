// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::calc::Operation;

pub use state::AppState;
pub use types::{Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in increasing priority: built-in defaults, the file (optional),
    /// `SERVER_*` environment variables (`SERVER_HTTP__MAX_BODY_SIZE=...`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", "arith-server")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would hide an operation endpoint
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.health.enabled {
            if let Some(op) = Operation::from_path(&self.health.path) {
                return Err(config::ConfigError::Message(format!(
                    "health.path {} is already the {op} endpoint",
                    self.health.path
                )));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Pick the config path from `--config <path>` / `-c <path>` arguments
pub fn config_path_from_args<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            if let Some(path) = args.next() {
                return path.trim_end_matches(".toml").to_string();
            }
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely/not/here/config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.path, "/healthz");
        assert!(cfg.server.workers.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\nworkers = 2\n\n[logging]\nlevel = \"warn\"\n\n[health]\nenabled = false"
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.logging.level, "warn");
        assert!(!cfg.health.enabled);
        assert_eq!(cfg.health.path, "/healthz");
    }

    #[test]
    fn test_health_path_cannot_shadow_an_operation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shadow.toml");
        std::fs::write(&path, "[health]\npath = \"/soma\"\n").unwrap();

        let base = path.with_extension("");
        let err = Config::load_from(base.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("/soma"), "{err}");

        let mut cfg = Config::load_from("definitely/not/here/config").unwrap();
        cfg.health.path = "/divisao".to_string();
        assert!(cfg.validate().is_err());
        // A disabled probe never answers, so the path is free
        cfg.health.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("definitely/not/here/config").unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:8080");

        cfg.server.host = "not a host".to_string();
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_config_path_from_args() {
        let args = |v: &[&str]| v.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(config_path_from_args(args(&["bin"])), "config");
        assert_eq!(
            config_path_from_args(args(&["bin", "--config", "conf/prod.toml"])),
            "conf/prod"
        );
        assert_eq!(config_path_from_args(args(&["bin", "-c", "local"])), "local");
        assert_eq!(config_path_from_args(args(&["bin", "-c"])), "config");
    }
}
