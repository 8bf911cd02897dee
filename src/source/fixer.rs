//! Fixer-style JSON API: `{"symbols": {...}}` and `{"rates": {...}}` behind an
//! `access_key` query parameter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{ensure_not_empty, load_text, normalize_rate, source_code, RateSource, SourceError};
use crate::currency::{RateMap, SymbolMap};

const NAME: &str = "fixer";

#[derive(Debug, Deserialize)]
struct SymbolsPayload {
    symbols: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: Option<BTreeMap<String, Decimal>>,
}

pub struct FixerSource {
    client: Client,
    symbols_url: Url,
    rates_url: Url,
}

impl FixerSource {
    pub fn new(
        client: Client,
        symbols_url: &str,
        rates_url: &str,
        access_key: &str,
    ) -> anyhow::Result<Self> {
        let params = [("access_key", access_key)];

        Ok(Self {
            client,
            symbols_url: Url::parse_with_params(symbols_url, &params)?,
            rates_url: Url::parse_with_params(rates_url, &params)?,
        })
    }
}

#[async_trait]
impl RateSource for FixerSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_symbols(&self) -> Result<SymbolMap, SourceError> {
        let text = load_text(&self.client, self.symbols_url.clone()).await?;
        parse_symbols(&text)
    }

    async fn fetch_rates(&self) -> Result<RateMap, SourceError> {
        let text = load_text(&self.client, self.rates_url.clone()).await?;
        parse_rates(&text)
    }
}

fn parse_symbols(text: &str) -> Result<SymbolMap, SourceError> {
    let payload: SymbolsPayload = serde_json::from_str(text)?;
    let symbols = payload
        .symbols
        .ok_or_else(|| SourceError::Malformed("missing \"symbols\"".to_string()))?;

    let map = symbols
        .into_iter()
        .filter_map(|(raw, name)| source_code(NAME, &raw).map(|code| (code, name)))
        .collect();

    ensure_not_empty(map, "symbols")
}

fn parse_rates(text: &str) -> Result<RateMap, SourceError> {
    let payload: RatesPayload = serde_json::from_str(text)?;
    let rates = payload
        .rates
        .ok_or_else(|| SourceError::Malformed("missing \"rates\"".to_string()))?;

    let mut map = RateMap::new();
    for (raw, rate) in rates {
        if let Some(code) = source_code(NAME, &raw) {
            let rate = normalize_rate(&code, rate)?;
            map.insert(code, rate);
        }
    }

    ensure_not_empty(map, "rates")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[test]
    fn parses_rates() {
        let rates = parse_rates(
            r#"{"success": true, "base": "EUR", "rates": {"EUR": 1, "USD": 1.083421, "JPY": 161.2345678}}"#,
        )
        .unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates[&code("EUR")], dec!(1));
        assert_eq!(rates[&code("USD")], dec!(1.08342));
        assert_eq!(rates[&code("JPY")], dec!(161.235));
    }

    #[test]
    fn parses_symbols_and_skips_odd_codes() {
        let symbols = parse_symbols(
            r#"{"success": true, "symbols": {"EUR": "Euro", "USD": "United States Dollar", "XDR1": "Bogus"}}"#,
        )
        .unwrap();

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[&code("USD")], "United States Dollar");
    }

    #[test]
    fn error_payload_is_malformed() {
        let body = r#"{"success": false, "error": {"code": 101, "type": "invalid_access_key"}}"#;

        assert!(matches!(parse_rates(body), Err(SourceError::Malformed(_))));
        assert!(matches!(parse_symbols(body), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(matches!(parse_rates("<html>502</html>"), Err(SourceError::Json(_))));
    }

    #[test]
    fn negative_rate_is_malformed() {
        let err = parse_rates(r#"{"rates": {"USD": -1.2}}"#).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn access_key_is_added_to_both_urls() {
        let source = FixerSource::new(
            Client::new(),
            "http://data.fixer.io/api/symbols",
            "http://data.fixer.io/api/latest",
            "secret",
        )
        .unwrap();

        assert_eq!(
            source.rates_url.as_str(),
            "http://data.fixer.io/api/latest?access_key=secret"
        );
        assert_eq!(source.symbols_url.query(), Some("access_key=secret"));
    }
}
