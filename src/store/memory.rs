use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::RateStore;
use crate::currency::{Currency, CurrencyCode, RateMap, UpdateRecord};
use crate::error::{ExchangeError, ExchangeResult};

#[derive(Debug, Default, Clone)]
struct State {
    currencies: BTreeMap<CurrencyCode, Currency>,
    ledger: Vec<UpdateRecord>,
}

/// In-memory store. Writes are staged on a copy of the state and swapped in
/// under the write lock, so a failed commit leaves nothing behind.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    state: RwLock<State>,
    fail_commits: AtomicBool,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `seed`/`apply_refresh` fail at commit time.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub async fn ledger(&self) -> Vec<UpdateRecord> {
        self.state.read().await.ledger.clone()
    }

    fn commit(&self) -> ExchangeResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(ExchangeError::Storage(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get_rate(&self, code: &CurrencyCode) -> ExchangeResult<Decimal> {
        self.state
            .read()
            .await
            .currencies
            .get(code)
            .map(|c| c.rate)
            .ok_or_else(|| ExchangeError::NotFound(format!("currency {}", code)))
    }

    async fn currency(&self, code: &CurrencyCode) -> ExchangeResult<Currency> {
        self.state
            .read()
            .await
            .currencies
            .get(code)
            .cloned()
            .ok_or_else(|| ExchangeError::NotFound(format!("currency {}", code)))
    }

    async fn list_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        Ok(self.state.read().await.currencies.values().cloned().collect())
    }

    async fn latest_record(&self) -> ExchangeResult<UpdateRecord> {
        self.state
            .read()
            .await
            .ledger
            .iter()
            .max_by_key(|r| (r.last_update, r.id))
            .copied()
            .ok_or_else(|| ExchangeError::NotFound("no rate update recorded".to_string()))
    }

    async fn is_seeded(&self) -> ExchangeResult<bool> {
        Ok(!self.state.read().await.ledger.is_empty())
    }

    async fn seed(&self, currencies: &[Currency], at: DateTime<Utc>) -> ExchangeResult<()> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        for currency in currencies {
            if staged.currencies.contains_key(&currency.code) {
                return Err(ExchangeError::Conflict(format!(
                    "currency {} already exists",
                    currency.code
                )));
            }
            staged.currencies.insert(currency.code.clone(), currency.clone());
        }
        staged.ledger.push(UpdateRecord::new(at));

        self.commit()?;
        *state = staged;

        Ok(())
    }

    async fn apply_refresh(&self, rates: &RateMap, at: DateTime<Utc>) -> ExchangeResult<usize> {
        let mut state = self.state.write().await;
        if state.currencies.is_empty() {
            return Err(ExchangeError::NotFound("store not seeded".to_string()));
        }
        let mut staged = state.clone();

        let mut updated = 0;
        for (code, rate) in rates {
            if let Some(currency) = staged.currencies.get_mut(code) {
                currency.rate = *rate;
                updated += 1;
            }
        }
        staged.ledger.push(UpdateRecord::new(at));

        self.commit()?;
        *state = staged;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    async fn seeded() -> MemoryRateStore {
        let store = MemoryRateStore::new();
        store
            .seed(
                &[
                    Currency::new(code("USD"), "US Dollar", dec!(1.0)),
                    Currency::new(code("EUR"), "Euro", dec!(0.9)),
                ],
                Utc::now() - Duration::hours(1),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn empty_store_has_no_ledger() {
        let store = MemoryRateStore::new();

        assert!(!store.is_seeded().await.unwrap());
        assert!(matches!(
            store.latest_record().await,
            Err(ExchangeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refresh_ignores_unknown_codes() {
        let store = seeded().await;
        let rates = RateMap::from([(code("EUR"), dec!(0.95)), (code("GBP"), dec!(0.8))]);

        let updated = store.apply_refresh(&rates, Utc::now()).await.unwrap();

        assert_eq!(updated, 1);
        assert_eq!(store.get_rate(&code("EUR")).await.unwrap(), dec!(0.95));
        assert_eq!(store.get_rate(&code("USD")).await.unwrap(), dec!(1.0));
        assert!(store.get_rate(&code("GBP")).await.is_err());
        assert_eq!(store.ledger().await.len(), 2);
    }

    #[tokio::test]
    async fn failed_commit_changes_nothing() {
        let store = seeded().await;
        let before = store.latest_record().await.unwrap();
        store.fail_commits(true);

        let rates = RateMap::from([(code("EUR"), dec!(0.5))]);
        let err = store.apply_refresh(&rates, Utc::now()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Storage(_)));
        assert_eq!(store.get_rate(&code("EUR")).await.unwrap(), dec!(0.9));
        assert_eq!(store.latest_record().await.unwrap(), before);
        assert_eq!(store.ledger().await.len(), 1);
    }

    #[tokio::test]
    async fn seeding_twice_conflicts() {
        let store = seeded().await;

        let err = store
            .seed(&[Currency::new(code("USD"), "US Dollar", dec!(1))], Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::Conflict(_)));
        assert_eq!(store.ledger().await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_before_seeding_writes_nothing() {
        let store = MemoryRateStore::new();
        let rates = RateMap::from([(code("EUR"), dec!(0.95))]);

        let err = store.apply_refresh(&rates, Utc::now()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::NotFound(_)));
        assert!(store.ledger().await.is_empty());
        assert!(!store.is_seeded().await.unwrap());
    }

    #[tokio::test]
    async fn currencies_are_listed_by_code() {
        let store = seeded().await;

        let codes: Vec<String> = store
            .list_currencies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code.to_string())
            .collect();

        assert_eq!(codes, ["EUR", "USD"]);
    }
}
