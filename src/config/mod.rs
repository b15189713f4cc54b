// Configuration module entry point
// Layered configuration: optional file, then WIDGETS_* environment, then defaults

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4778)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.server_name", concat!("widget_server/", env!("CARGO_PKG_VERSION")))?
            .set_default("http.max_body_size", 1_048_576) // 1MB
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("WIDGETS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 4778);
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:4778".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("/nonexistent/widget-server-config").unwrap();
        assert_eq!(cfg.http.server_name, Config::defaults().unwrap().http.server_name);
    }

    #[test]
    fn test_worker_count() {
        let load = |workers: i64| {
            Config::builder()
                .unwrap()
                .set_override("server.workers", workers)
                .unwrap()
                .build()
                .unwrap()
                .try_deserialize::<Config>()
        };

        assert!(load(0).is_err());
        assert_eq!(load(4).unwrap().server.workers.map(std::num::NonZeroUsize::get), Some(4));
    }

    #[test]
    fn test_invalid_host() {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
