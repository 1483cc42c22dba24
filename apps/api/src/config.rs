use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub assessment: AssessmentSettings,
    pub generation: GenerationSettings,
}

/// Lifetimes and limits for masters, instances and submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentSettings {
    pub master_ttl_days: i64,
    pub instance_ttl_days: i64,
    pub max_attempts: i32,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            master_ttl_days: 30,
            instance_ttl_days: 2,
            max_attempts: 3,
        }
    }
}

impl AssessmentSettings {
    pub fn master_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.master_ttl_days)
    }

    pub fn instance_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.instance_ttl_days)
    }
}

/// Backpressure for the generator gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub concurrency: usize,
    pub min_interval: Duration,
    pub queue_wait: Duration,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            min_interval: Duration::from_millis(1000),
            queue_wait: Duration::from_secs(30),
            timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let assessment_defaults = AssessmentSettings::default();
        let generation_defaults = GenerationSettings::default();

        let assessment = AssessmentSettings {
            master_ttl_days: optional_env("MASTER_TTL_DAYS", assessment_defaults.master_ttl_days)?,
            instance_ttl_days: optional_env(
                "INSTANCE_TTL_DAYS",
                assessment_defaults.instance_ttl_days,
            )?,
            max_attempts: optional_env("MAX_ATTEMPTS", assessment_defaults.max_attempts)?,
        };
        anyhow::ensure!(assessment.max_attempts > 0, "MAX_ATTEMPTS must be positive");

        let generation = GenerationSettings {
            concurrency: optional_env("GENERATION_CONCURRENCY", generation_defaults.concurrency)?,
            min_interval: Duration::from_millis(optional_env(
                "GENERATION_MIN_INTERVAL_MS",
                generation_defaults.min_interval.as_millis() as u64,
            )?),
            queue_wait: Duration::from_secs(optional_env(
                "GENERATION_QUEUE_WAIT_SECS",
                generation_defaults.queue_wait.as_secs(),
            )?),
            timeout: Duration::from_secs(optional_env(
                "GENERATION_TIMEOUT_SECS",
                generation_defaults.timeout.as_secs(),
            )?),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            assessment,
            generation,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
