use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::placement::commission::CommissionSettings;

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
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub commission: CommissionSettings,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            commission: load_commission_settings()?,
        })
    }
}

fn load_commission_settings() -> Result<CommissionSettings, ConfigError> {
    let defaults = CommissionSettings::default();

    let settings = CommissionSettings {
        min_percentage: number_or("COMMISSION_MIN_PERCENTAGE", defaults.min_percentage)?,
        max_percentage: number_or("COMMISSION_MAX_PERCENTAGE", defaults.max_percentage)?,
        default_reduction_percentage: number_or(
            "COMMISSION_DEFAULT_REDUCTION",
            defaults.default_reduction_percentage,
        )?,
        min_recruiter_floor: number_or(
            "COMMISSION_MIN_RECRUITER_FLOOR",
            defaults.min_recruiter_floor,
        )?,
        currency: env::var("COMMISSION_CURRENCY")
            .map(|value| value.trim().to_ascii_uppercase())
            .unwrap_or(defaults.currency),
    };

    let bounds = [
        settings.min_percentage,
        settings.max_percentage,
        settings.default_reduction_percentage,
        settings.min_recruiter_floor,
    ];
    if bounds.iter().any(|value| *value < 0.0)
        || settings.min_percentage > settings.max_percentage
        || settings.default_reduction_percentage > 100.0
    {
        return Err(ConfigError::InvalidCommissionBounds);
    }

    Ok(settings)
}

fn number_or(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidCommissionBounds,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a finite number"),
            ConfigError::InvalidCommissionBounds => write!(
                f,
                "commission bounds must be non-negative with min <= max and reduction <= 100"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidCommissionBounds => None,
        }
    }
}
