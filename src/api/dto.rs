use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::{Currency, CurrencyCode, UpdateRecord};
use crate::error::{ExchangeError, ExchangeResult};
use crate::service::conversion::to_display;
use crate::service::Conversion;

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub original_code: String,
    pub target_code: String,
    pub amount: Decimal,
}

impl ConvertRequest {
    /// Codes must be three letters (any case); the amount must not be
    /// negative.
    pub fn validate(&self) -> ExchangeResult<(CurrencyCode, CurrencyCode, Decimal)> {
        let original: CurrencyCode = self.original_code.parse()?;
        let target: CurrencyCode = self.target_code.parse()?;

        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ExchangeError::InvalidInput(
                "amount must be greater than or equal to 0".to_string(),
            ));
        }

        Ok((original, target, self.amount))
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub original_code: CurrencyCode,
    pub target_code: CurrencyCode,
    pub amount: Decimal,
    pub result: Decimal,
    pub date_time: DateTime<Utc>,
}

impl From<Conversion> for ConvertResponse {
    fn from(conversion: Conversion) -> Self {
        Self {
            original_code: conversion.original_code,
            target_code: conversion.target_code,
            amount: to_display(conversion.amount),
            result: conversion.result,
            date_time: conversion.converted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LastUpdatedResponse {
    pub last_update: DateTime<Utc>,
}

impl From<UpdateRecord> for LastUpdatedResponse {
    fn from(record: UpdateRecord) -> Self {
        Self {
            last_update: record.last_update,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrencyResponse {
    pub code: CurrencyCode,
    pub name: String,
    /// Stored precision, not rounded to 2 places.
    pub rate: Decimal,
}

impl From<Currency> for CurrencyResponse {
    fn from(currency: Currency) -> Self {
        Self {
            code: currency.code,
            name: currency.name,
            rate: currency.rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}
