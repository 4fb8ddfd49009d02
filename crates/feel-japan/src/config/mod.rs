use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub site: SiteConfig,
    pub capture: CaptureConfig,
    pub studio: StudioConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = BackendConfig {
            url: optional_var("BACKEND_URL").map(|url| url.trim_end_matches('/').to_string()),
            anon_key: optional_var("BACKEND_ANON_KEY"),
            service_key: optional_var("BACKEND_SERVICE_KEY"),
        };

        let site = SiteConfig {
            public_origin: optional_var("SITE_PUBLIC_ORIGIN")
                .map(|origin| origin.trim_end_matches('/').to_string()),
            verifier_cookie: optional_var("AUTH_VERIFIER_COOKIE"),
        };

        let capture = CaptureConfig {
            command: optional_var("CAPTURE_COMMAND")
                .map(|raw| raw.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(CaptureConfig::default_command),
            output_dir: optional_var("CAPTURE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dist/brochures")),
            workers: parse_var("CAPTURE_WORKERS", 2, "CAPTURE_WORKERS")?,
            queue_capacity: parse_var("CAPTURE_QUEUE_CAPACITY", 32, "CAPTURE_QUEUE_CAPACITY")?,
            timeout: Duration::from_secs(parse_var(
                "CAPTURE_TIMEOUT_SECS",
                180,
                "CAPTURE_TIMEOUT_SECS",
            )?),
        };
        if capture.command.is_empty() {
            return Err(ConfigError::EmptyCaptureCommand);
        }
        if capture.workers == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "CAPTURE_WORKERS",
            });
        }

        let studio = StudioConfig {
            access_key: optional_var("STUDIO_ACCESS_KEY"),
            token_ttl: Duration::from_secs(
                parse_var::<u64>("STUDIO_TOKEN_TTL_MINUTES", 480, "STUDIO_TOKEN_TTL_MINUTES")?
                    * 60,
            ),
        };

        let mail = MailConfig {
            api_key: optional_var("RESEND_API_KEY"),
            from_address: env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
            support_address: env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "admin@pintarweb.com".to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend,
            site,
            capture,
            studio,
            mail,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    default: T,
    label: &'static str,
) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name: label }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Hosted backend (REST + auth) credentials. Without a URL the service runs on
/// in-memory stores.
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_key: Option<String>,
}

impl BackendConfig {
    /// Service key when present, otherwise the anonymous key.
    pub fn api_key(&self) -> Option<&str> {
        self.service_key
            .as_deref()
            .or(self.anon_key.as_deref())
    }
}

/// Public-facing site settings used when building redirects.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    pub public_origin: Option<String>,
    pub verifier_cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub command: Vec<String>,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub queue_capacity: usize,
    pub timeout: Duration,
}

impl CaptureConfig {
    fn default_command() -> Vec<String> {
        vec![
            "npx".to_string(),
            "tsx".to_string(),
            ".agent/skills/brochure-capture/scripts/capture.ts".to_string(),
        ]
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: Self::default_command(),
            output_dir: PathBuf::from("dist/brochures"),
            workers: 2,
            queue_capacity: 32,
            timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub access_key: Option<String>,
    pub token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from_address: String,
    pub support_address: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    EmptyCaptureCommand,
    BackendNotConfigured,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a positive integer")
            }
            ConfigError::EmptyCaptureCommand => write!(f, "CAPTURE_COMMAND must not be empty"),
            ConfigError::BackendNotConfigured => {
                write!(f, "BACKEND_URL and a backend key are required")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::EmptyCaptureCommand
            | ConfigError::BackendNotConfigured => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "BACKEND_URL",
            "BACKEND_ANON_KEY",
            "BACKEND_SERVICE_KEY",
            "SITE_PUBLIC_ORIGIN",
            "CAPTURE_COMMAND",
            "CAPTURE_WORKERS",
            "CAPTURE_QUEUE_CAPACITY",
            "CAPTURE_TIMEOUT_SECS",
            "STUDIO_ACCESS_KEY",
            "STUDIO_TOKEN_TTL_MINUTES",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.backend.url.is_none());
        assert_eq!(config.capture.workers, 2);
        assert_eq!(config.capture.queue_capacity, 32);
        assert_eq!(config.studio.token_ttl, Duration::from_secs(8 * 60 * 60));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn backend_url_is_trimmed_and_service_key_preferred() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BACKEND_URL", "https://project.example.co/");
        env::set_var("BACKEND_ANON_KEY", "anon");
        env::set_var("BACKEND_SERVICE_KEY", "service");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://project.example.co")
        );
        assert_eq!(config.backend.api_key(), Some("service"));
        reset_env();
    }

    #[test]
    fn rejects_zero_capture_workers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAPTURE_WORKERS", "0");
        let err = AppConfig::load().expect_err("zero workers rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                name: "CAPTURE_WORKERS"
            }
        ));
        reset_env();
    }

    #[test]
    fn capture_command_splits_on_whitespace() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAPTURE_COMMAND", "node  capture.js");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.capture.command, vec!["node", "capture.js"]);
        reset_env();
    }
}
