use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::assignment::{AllocationSettings, CapacityPolicy, RelevanceScore, StrategyKind};

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
    pub allocation: AllocationSettings,
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
            allocation: load_allocation()?,
        })
    }
}

fn load_allocation() -> Result<AllocationSettings, ConfigError> {
    let defaults = AllocationSettings::default();

    let strategy = match non_empty_var("ASSIGN_STRATEGY") {
        Some(raw) => StrategyKind::from_label(&raw).ok_or(ConfigError::InvalidStrategy(raw))?,
        None => defaults.strategy,
    };

    let neutral_score = parse_var::<f32>("ASSIGN_NEUTRAL_SCORE")?
        .map(RelevanceScore::new)
        .unwrap_or(defaults.neutral_score);

    Ok(AllocationSettings {
        strategy,
        test_limit: parse_var("ASSIGN_TEST_LIMIT")?,
        candidates_per_paper: parse_var("ASSIGN_CANDIDATES_PER_PAPER")?,
        capacity: CapacityPolicy {
            default_capacity: parse_var("ASSIGN_DEFAULT_CAPACITY")?,
            capacity_override: parse_var("ASSIGN_CAPACITY_OVERRIDE")?,
        },
        load_penalty: load_penalty()?.unwrap_or(defaults.load_penalty),
        penalty_reference_capacity: parse_var("ASSIGN_PENALTY_REFERENCE_CAPACITY")?
            .unwrap_or(defaults.penalty_reference_capacity),
        cap_slack: parse_var("ASSIGN_CAP_SLACK")?.unwrap_or(defaults.cap_slack),
        neutral_score,
        scoring_concurrency: parse_var("ASSIGN_SCORING_CONCURRENCY")?
            .unwrap_or(defaults.scoring_concurrency),
        checkpoint_every: parse_var("ASSIGN_CHECKPOINT_EVERY")?
            .unwrap_or(defaults.checkpoint_every),
        classify_missing: parse_var("ASSIGN_CLASSIFY_MISSING")?
            .unwrap_or(defaults.classify_missing),
    })
}

/// A negative or non-finite penalty would favor busy reviewers.
fn load_penalty() -> Result<Option<f32>, ConfigError> {
    const NAME: &str = "ASSIGN_LOAD_PENALTY";
    match parse_var::<f32>(NAME)? {
        Some(penalty) if !penalty.is_finite() || penalty < 0.0 => Err(ConfigError::InvalidValue {
            name: NAME,
            value: non_empty_var(NAME).unwrap_or_default(),
        }),
        penalty => Ok(penalty),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    non_empty_var(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        })
        .transpose()
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
    InvalidStrategy(String),
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStrategy(value) => write!(
                f,
                "ASSIGN_STRATEGY must be 'scarcity' or 'global' (got '{value}')"
            ),
            ConfigError::InvalidValue { name, value } => {
                write!(f, "{name} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStrategy(_)
            | ConfigError::InvalidValue { .. } => None,
        }
    }
}
