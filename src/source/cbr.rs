//! Central Bank of Russia daily rates (`XML_daily.asp`).
//!
//! The bank quotes roubles per unit of each currency, so the rate map is the
//! inverse of `VunitRate` with RUB as the base.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;

use super::val_curs::ValCurs;
use super::{ensure_not_empty, load_text, normalize_rate, source_code, RateSource, SourceError};
use crate::currency::{CurrencyCode, RateMap, SymbolMap};

const NAME: &str = "cbr";
const BASE_CODE: &str = "RUB";
const BASE_NAME: &str = "Российский рубль";

pub struct CbrSource {
    client: Client,
    url: String,
}

impl CbrSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn url_for(&self, date: NaiveDate) -> String {
        format!("{}?date_req={}", self.url, date.format("%d/%m/%Y"))
    }

    async fn get_val_curs(&self) -> Result<ValCurs, SourceError> {
        let today = Utc::now().date_naive();
        let text = load_text(&self.client, self.url_for(today)).await?;
        parse_val_curs(&text)
    }
}

#[async_trait]
impl RateSource for CbrSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_symbols(&self) -> Result<SymbolMap, SourceError> {
        let val_curs = self.get_val_curs().await?;
        symbols_from(&val_curs)
    }

    async fn fetch_rates(&self) -> Result<RateMap, SourceError> {
        let val_curs = self.get_val_curs().await?;
        rates_from(&val_curs)
    }
}

fn parse_val_curs(text: &str) -> Result<ValCurs, SourceError> {
    let val_curs: ValCurs = quick_xml::de::from_str(text)?;
    Ok(val_curs)
}

fn base_code() -> Result<CurrencyCode, SourceError> {
    CurrencyCode::from_str(BASE_CODE).map_err(|e| SourceError::Malformed(e.to_string()))
}

fn symbols_from(val_curs: &ValCurs) -> Result<SymbolMap, SourceError> {
    let mut map = SymbolMap::new();

    for valute in &val_curs.valute {
        if let Some(code) = source_code(NAME, &valute.char_code) {
            map.insert(code, valute.name.trim().to_string());
        }
    }

    let mut map = ensure_not_empty(map, "currencies")?;
    map.insert(base_code()?, BASE_NAME.to_string());

    Ok(map)
}

fn rates_from(val_curs: &ValCurs) -> Result<RateMap, SourceError> {
    let mut map = RateMap::new();

    for valute in &val_curs.valute {
        let Some(code) = source_code(NAME, &valute.char_code) else {
            continue;
        };

        let normalized_string = normalize_decimal_string(&valute.vunit_rate);
        let roubles_per_unit = Decimal::from_str(&normalized_string).map_err(|e| {
            SourceError::Malformed(format!("bad rate {:?} for {}: {}", valute.vunit_rate, code, e))
        })?;

        let rate = Decimal::ONE
            .checked_div(roubles_per_unit)
            .ok_or_else(|| SourceError::Malformed(format!("zero rate for {}", code)))?;

        let rate = normalize_rate(&code, rate)?;
        map.insert(code, rate);
    }

    let mut map = ensure_not_empty(map, "rates")?;
    map.insert(base_code()?, Decimal::ONE);

    Ok(map)
}

fn normalize_decimal_string(s: &str) -> String {
    s.trim().replace(',', ".")
}
