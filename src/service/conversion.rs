use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::currency::CurrencyCode;
use crate::error::{ExchangeError, ExchangeResult};
use crate::store::RateStore;

/// Decimal places of every converted amount.
pub const DISPLAY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub original_code: CurrencyCode,
    pub target_code: CurrencyCode,
    pub amount: Decimal,
    pub result: Decimal,
    pub converted_at: DateTime<Utc>,
}

/// Read-only conversion against the current rate table.
pub struct ConversionEngine {
    store: Arc<dyn RateStore>,
}

impl ConversionEngine {
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    pub async fn convert(
        &self,
        original_code: &CurrencyCode,
        target_code: &CurrencyCode,
        amount: Decimal,
    ) -> ExchangeResult<Conversion> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ExchangeError::InvalidInput(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }

        let original_rate = self.store.get_rate(original_code).await?;
        let target_rate = self.store.get_rate(target_code).await?;
        if original_rate.is_zero() {
            return Err(ExchangeError::InvalidRate(original_code.to_string()));
        }

        let result = convert_amount(amount, original_rate, target_rate)?;

        Ok(Conversion {
            original_code: original_code.clone(),
            target_code: target_code.clone(),
            amount,
            result,
            converted_at: Utc::now(),
        })
    }
}

/// `amount * target_rate / original_rate`, rounded half-up to
/// [`DISPLAY_SCALE`] places.
pub fn convert_amount(
    amount: Decimal,
    original_rate: Decimal,
    target_rate: Decimal,
) -> ExchangeResult<Decimal> {
    if original_rate.is_zero() {
        return Err(ExchangeError::InvalidRate("zero original rate".to_string()));
    }

    let result = amount
        .checked_mul(target_rate)
        .and_then(|v| v.checked_div(original_rate))
        .ok_or_else(|| ExchangeError::InvalidInput("amount too large".to_string()))?;

    Ok(to_display(result))
}

/// Rounds half-up and pads to exactly [`DISPLAY_SCALE`] places.
pub fn to_display(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_SCALE);
    rounded
}
