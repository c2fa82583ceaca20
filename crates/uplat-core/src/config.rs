use std::{env, num::ParseIntError, path::PathBuf};

use thiserror::Error;

/// Upload endpoint exposed by the plate-processing API.
pub const DEFAULT_API_URL: &str = "http://api:8000/api/v1/processar-placa";

/// File name of the fixed test image inside the output directory.
pub const TEST_IMAGE_NAME: &str = "imagem_teste.jpg";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub num_requests: u32,
    pub image_path: PathBuf,
    pub api_key: String,
    pub db: DbConfig,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let num_requests = {
            let raw = require(lookup, "NUM_REQUESTS_PERFORMANCE_TEST")?;
            parse_count("NUM_REQUESTS_PERFORMANCE_TEST", &raw)?
        };
        let image_dir = PathBuf::from(require(lookup, "YOLO_OUTPUT_DIR")?);

        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            num_requests,
            image_path: image_dir.join(TEST_IMAGE_NAME),
            api_key: require(lookup, "API_KEY_PERFORMANCE_TEST")?,
            db: DbConfig::from_lookup(lookup)?,
        })
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = {
            let raw = optional(lookup, "POSTGRES_PORT", "5432");
            parse_port("POSTGRES_PORT", &raw)?
        };

        Ok(Self {
            dbname: require(lookup, "POSTGRES_DB")?,
            user: require(lookup, "POSTGRES_USER")?,
            password: require(lookup, "POSTGRES_PASSWORD")?,
            host: optional(lookup, "POSTGRES_HOST", "localhost"),
            port,
        })
    }

    /// Session parameters for the results database.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password)
            .host(&self.host)
            .port(self.port);
        config
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::Missing(name))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

/// The count feeds the `int4` index column, so it is capped at `i32::MAX`.
fn parse_count(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let count: u32 = raw
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { name, source })?;
    if count > i32::MAX as u32 {
        return Err(ConfigError::OutOfRange {
            name,
            max: i32::MAX as u32,
        });
    }
    Ok(count)
}

fn parse_port(name: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { name, source })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} is not a valid number: {source}")]
    InvalidNumber {
        name: &'static str,
        source: ParseIntError,
    },
    #[error("environment variable {name} must be at most {max}")]
    OutOfRange { name: &'static str, max: u32 },
}
