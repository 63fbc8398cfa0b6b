/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | DATABASE_URL | - | PostgreSQL URL; in-memory stores when unset |
/// | CATALOG_PATH | - | JSON reference catalog replacing the built-in one |
/// | LOG_LEVEL | info | Log filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | - | Directory for rolling log files |
/// | ENVIRONMENT | development | development, staging or production |
/// | MAX_BODY_BYTES | 10485760 | Request body limit |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=postgres://localhost/pricing HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_url: Option<String>,
    pub catalog_path: Option<String>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
    pub max_body_bytes: usize,
    pub request_timeout_ms: u64,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: non_empty_var("DATABASE_URL"),
            catalog_path: non_empty_var("CATALOG_PATH"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: non_empty_var("LOG_DIR"),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// Defaults without touching the environment, for tests
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            database_url: None,
            catalog_path: None,
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            environment: "test".into(),
            max_body_bytes: 1024 * 1024,
            request_timeout_ms: 5000,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
