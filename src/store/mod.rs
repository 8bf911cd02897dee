//! Rate store and update ledger.
//!
//! Both tables live behind one trait so that the refresh can change rates and
//! append its ledger entry in a single transaction. The ledger has no public
//! append: records are only written by [`RateStore::seed`] and
//! [`RateStore::apply_refresh`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::currency::{Currency, CurrencyCode, RateMap, UpdateRecord};
use crate::error::ExchangeResult;

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use postgres::PgRateStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryRateStore;

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Current rate of `code`, or `NotFound`.
    async fn get_rate(&self, code: &CurrencyCode) -> ExchangeResult<Decimal>;

    async fn currency(&self, code: &CurrencyCode) -> ExchangeResult<Currency>;

    /// All currencies ordered by code.
    async fn list_currencies(&self) -> ExchangeResult<Vec<Currency>>;

    /// Most recent ledger entry, or `NotFound` when the ledger is empty.
    async fn latest_record(&self) -> ExchangeResult<UpdateRecord>;

    async fn is_seeded(&self) -> ExchangeResult<bool>;

    /// Inserts the initial currency table together with the first ledger
    /// entry.
    async fn seed(&self, currencies: &[Currency], at: DateTime<Utc>) -> ExchangeResult<()>;

    /// Overwrites the rate of every known code in `rates` and appends one
    /// ledger entry stamped `at`, all or nothing. Unknown codes are ignored.
    /// Returns the number of currencies updated, or `NotFound` when the store
    /// has not been seeded.
    async fn apply_refresh(&self, rates: &RateMap, at: DateTime<Utc>) -> ExchangeResult<usize>;
}
