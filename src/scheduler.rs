//! Background task that refreshes rates on a fixed period.

use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::service::ExchangeService;

/// Spawns the refresh loop. The first refresh runs one `period` after start,
/// since seeding has just filled the table.
pub fn start_refresh_scheduler(service: Arc<ExchangeService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("rate refresh scheduler started ({}s interval)", period.as_secs());

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match service.refresh().await {
                Ok(outcome) => info!(
                    "scheduled refresh updated {} currencies",
                    outcome.updated
                ),
                Err(e) => warn!("scheduled refresh failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{CurrencyCode, RateMap, SymbolMap};
    use crate::source::StaticSource;
    use crate::store::MemoryRateStore;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_every_period_and_survives_failures() {
        let store = Arc::new(MemoryRateStore::new());
        let source = Arc::new(StaticSource::new(
            SymbolMap::from([(code("USD"), "US Dollar".to_string())]),
            RateMap::from([(code("USD"), dec!(1))]),
        ));
        let service = Arc::new(ExchangeService::new(store.clone(), source.clone()));
        service.initialize().await.unwrap();

        let handle = start_refresh_scheduler(service, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(source.rate_calls(), 2);
        assert_eq!(store.ledger().await.len(), 2);

        source.set_unavailable(true);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.rate_calls(), 3);
        assert_eq!(store.ledger().await.len(), 2);

        source.set_unavailable(false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.rate_calls(), 4);
        assert_eq!(store.ledger().await.len(), 3);

        handle.abort();
    }
}
