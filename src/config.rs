use std::{env, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_CBR_URL: &str = "https://cbr.ru/scripts/XML_daily.asp";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Cbr {
        url: String,
    },
    Fixer {
        symbols_url: String,
        rates_url: String,
        access_key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub source: SourceConfig,
    pub source_timeout: Duration,
    /// `None` disables the background refresh.
    pub refresh_interval: Option<Duration>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{} must be set", key));

        let source = match lookup("RATE_SOURCE").as_deref().unwrap_or("cbr") {
            "cbr" => SourceConfig::Cbr {
                url: lookup("CBR_URL").unwrap_or_else(|| DEFAULT_CBR_URL.to_string()),
            },
            "fixer" => SourceConfig::Fixer {
                symbols_url: required("EXTERNAL_API_SYMBOLS_URL")?,
                rates_url: required("EXTERNAL_API_RATES_URL")?,
                access_key: required("EXTERNAL_API_KEY")?,
            },
            other => return Err(anyhow!("unknown RATE_SOURCE {:?}", other)),
        };

        let refresh_secs: u64 = parse_or(
            &lookup,
            "REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            source,
            source_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SOURCE_TIMEOUT_SECS",
                DEFAULT_SOURCE_TIMEOUT_SECS,
            )?),
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value {:?}", key, value)),
        None => Ok(default),
    }
}
