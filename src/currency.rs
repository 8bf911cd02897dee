use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExchangeError;

/// Three-letter currency code, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ExchangeError::InvalidInput(format!(
                "currency code must be 3 letters, got {:?}",
                s
            )));
        }

        Ok(CurrencyCode(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rates keyed by code, in units of the currency per one base unit.
pub type RateMap = BTreeMap<CurrencyCode, Decimal>;

/// Display names keyed by code.
pub type SymbolMap = BTreeMap<CurrencyCode, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub id: Uuid,
    pub code: CurrencyCode,
    pub name: String,
    pub rate: Decimal,
}

impl Currency {
    pub fn new(code: CurrencyCode, name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            id: Uuid::now_v7(),
            code,
            name: name.into(),
            rate,
        }
    }
}

/// One entry of the append-only update ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRecord {
    pub id: Uuid,
    pub last_update: DateTime<Utc>,
}

impl UpdateRecord {
    pub fn new(last_update: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            last_update,
        }
    }
}

/// Current time at the precision Postgres keeps for `timestamptz`.
pub fn ledger_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
