//! External rate sources.
//!
//! A source supplies the list of known symbols and the current rate map on
//! demand. Rates are expressed as units of each currency per one unit of the
//! source's base currency and are normalized to [`SIGNIFICANT_DIGITS`].

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, IntoUrl};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::SourceConfig;
use crate::currency::{CurrencyCode, RateMap, SymbolMap};

pub mod cbr;
pub mod fixer;
mod val_curs;

#[cfg(any(test, feature = "test-utils"))]
mod fake;

pub use cbr::CbrSource;
pub use fixer::FixerSource;

#[cfg(any(test, feature = "test-utils"))]
pub use fake::StaticSource;

pub const SIGNIFICANT_DIGITS: u32 = 6;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("xml decode failed: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_symbols(&self) -> Result<SymbolMap, SourceError>;

    async fn fetch_rates(&self) -> Result<RateMap, SourceError>;
}

/// Builds the configured source with a shared HTTP client.
pub fn build_source(
    config: &SourceConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn RateSource>> {
    let client = Client::builder().timeout(timeout).build()?;

    let source: Arc<dyn RateSource> = match config {
        SourceConfig::Cbr { url } => Arc::new(CbrSource::new(client, url.clone())),
        SourceConfig::Fixer {
            symbols_url,
            rates_url,
            access_key,
        } => Arc::new(FixerSource::new(client, symbols_url, rates_url, access_key)?),
    };

    Ok(source)
}

async fn load_text(client: &Client, url: impl IntoUrl) -> Result<String, SourceError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(SourceError::Status(resp.status()));
    }

    let text = resp.text().await?;

    Ok(text)
}

/// Parses a code coming from a source, skipping anything that is not a
/// three-letter code.
fn source_code(source: &str, raw: &str) -> Option<CurrencyCode> {
    match raw.parse() {
        Ok(code) => Some(code),
        Err(_) => {
            warn!("{}: skipping unsupported currency code {:?}", source, raw);
            None
        }
    }
}

fn normalize_rate(code: &CurrencyCode, rate: Decimal) -> Result<Decimal, SourceError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(SourceError::Malformed(format!(
            "negative rate {} for {}",
            rate, code
        )));
    }

    Ok(rate.round_sf(SIGNIFICANT_DIGITS).unwrap_or(rate).normalize())
}

fn ensure_not_empty<V>(
    map: BTreeMap<CurrencyCode, V>,
    what: &str,
) -> Result<BTreeMap<CurrencyCode, V>, SourceError> {
    if map.is_empty() {
        return Err(SourceError::Malformed(format!("no {} in response", what)));
    }

    Ok(map)
}
