//! Exchange operations exposed to the HTTP layer.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::currency::{Currency, CurrencyCode, UpdateRecord};
use crate::error::ExchangeResult;
use crate::source::RateSource;
use crate::store::RateStore;

mod bootstrap;
pub mod conversion;
pub mod refresh;

pub use bootstrap::seed_if_empty;
pub use conversion::{Conversion, ConversionEngine};
pub use refresh::{RefreshEngine, RefreshOutcome};

pub struct ExchangeService {
    store: Arc<dyn RateStore>,
    source: Arc<dyn RateSource>,
    refresher: RefreshEngine,
    converter: ConversionEngine,
}

impl ExchangeService {
    pub fn new(store: Arc<dyn RateStore>, source: Arc<dyn RateSource>) -> Self {
        Self {
            refresher: RefreshEngine::new(store.clone(), source.clone()),
            converter: ConversionEngine::new(store.clone()),
            store,
            source,
        }
    }

    /// Seeds the store on first start.
    pub async fn initialize(&self) -> ExchangeResult<bool> {
        seed_if_empty(self.store.as_ref(), self.source.as_ref()).await
    }

    pub async fn refresh(&self) -> ExchangeResult<RefreshOutcome> {
        self.refresher.refresh().await
    }

    pub async fn convert(
        &self,
        original_code: &CurrencyCode,
        target_code: &CurrencyCode,
        amount: Decimal,
    ) -> ExchangeResult<Conversion> {
        self.converter.convert(original_code, target_code, amount).await
    }

    pub async fn last_updated(&self) -> ExchangeResult<UpdateRecord> {
        self.store.latest_record().await
    }

    pub async fn list_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        self.store.list_currencies().await
    }

    pub async fn currency(&self, code: &CurrencyCode) -> ExchangeResult<Currency> {
        self.store.currency(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{RateMap, SymbolMap};
    use crate::error::ExchangeError;
    use crate::source::StaticSource;
    use crate::store::MemoryRateStore;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn refresh_changes_conversions_and_last_updated() {
        let store = Arc::new(MemoryRateStore::new());
        let source = Arc::new(StaticSource::new(
            SymbolMap::from([
                (code("USD"), "US Dollar".to_string()),
                (code("EUR"), "Euro".to_string()),
            ]),
            RateMap::from([(code("USD"), dec!(1.0)), (code("EUR"), dec!(0.9))]),
        ));
        let service = ExchangeService::new(store.clone(), source.clone());

        assert!(matches!(
            service.last_updated().await,
            Err(ExchangeError::NotFound(_))
        ));
        assert!(service.initialize().await.unwrap());
        let seeded_at = service.last_updated().await.unwrap();

        let conversion = service.convert(&code("USD"), &code("EUR"), dec!(100)).await.unwrap();
        assert_eq!(conversion.result.to_string(), "90.00");

        source.set_rates(RateMap::from([(code("EUR"), dec!(0.95))]));
        let outcome = service.refresh().await.unwrap();

        let conversion = service.convert(&code("USD"), &code("EUR"), dec!(100)).await.unwrap();
        assert_eq!(conversion.result.to_string(), "95.00");

        let last = service.last_updated().await.unwrap();
        assert_eq!(last.last_update, outcome.refreshed_at);
        assert!(last.last_update >= seeded_at.last_update);
        assert_ne!(last.id, seeded_at.id);
    }

    #[tokio::test]
    async fn refresh_before_initialize_does_not_block_seeding() {
        let store = Arc::new(MemoryRateStore::new());
        let source = Arc::new(StaticSource::new(
            SymbolMap::from([(code("USD"), "US Dollar".to_string())]),
            RateMap::from([(code("USD"), dec!(1))]),
        ));
        let service = ExchangeService::new(store.clone(), source);

        assert!(matches!(
            service.refresh().await,
            Err(ExchangeError::NotFound(_))
        ));
        assert!(store.ledger().await.is_empty());

        assert!(service.initialize().await.unwrap());
        assert_eq!(service.list_currencies().await.unwrap().len(), 1);
        assert_eq!(store.ledger().await.len(), 1);
    }

    #[tokio::test]
    async fn currency_lookup_by_code() {
        let store = Arc::new(MemoryRateStore::new());
        let source = Arc::new(StaticSource::new(
            SymbolMap::from([(code("USD"), "US Dollar".to_string())]),
            RateMap::from([(code("USD"), dec!(1))]),
        ));
        let service = ExchangeService::new(store, source);
        service.initialize().await.unwrap();

        let usd = service.currency(&code("usd")).await.unwrap();
        assert_eq!(usd.name, "US Dollar");
        assert!(matches!(
            service.currency(&code("GBP")).await,
            Err(ExchangeError::NotFound(_))
        ));
        assert_eq!(service.list_currencies().await.unwrap().len(), 1);
    }
}
