use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::currency::ledger_now;
use crate::error::{ExchangeError, ExchangeResult};
use crate::source::RateSource;
use crate::store::RateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Currencies whose rate was overwritten.
    pub updated: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Pulls the current rate map from the source and commits it together with a
/// ledger entry. Nothing is retried here; a failed attempt leaves the store as
/// it was.
pub struct RefreshEngine {
    store: Arc<dyn RateStore>,
    source: Arc<dyn RateSource>,
}

impl RefreshEngine {
    pub fn new(store: Arc<dyn RateStore>, source: Arc<dyn RateSource>) -> Self {
        Self { store, source }
    }

    pub async fn refresh(&self) -> ExchangeResult<RefreshOutcome> {
        let rates = self.source.fetch_rates().await.map_err(|e| {
            warn!("{}: failed to fetch rates: {}", self.source.name(), e);
            ExchangeError::from(e)
        })?;

        let refreshed_at = ledger_now();
        let updated = self.store.apply_refresh(&rates, refreshed_at).await?;

        info!(
            "{}: refreshed {} of {} fetched rates at {}",
            self.source.name(),
            updated,
            rates.len(),
            refreshed_at
        );

        Ok(RefreshOutcome {
            updated,
            refreshed_at,
        })
    }
}
