use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use super::{RateSource, SourceError};
use crate::currency::{RateMap, SymbolMap};

/// Scripted source for tests: serves whatever maps it was given and can be
/// switched into an unavailable state.
pub struct StaticSource {
    symbols: Mutex<SymbolMap>,
    rates: Mutex<RateMap>,
    unavailable: AtomicBool,
    rate_calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(symbols: SymbolMap, rates: RateMap) -> Self {
        Self {
            symbols: Mutex::new(symbols),
            rates: Mutex::new(rates),
            unavailable: AtomicBool::new(false),
            rate_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_rates(&self, rates: RateMap) {
        *self.rates.lock().unwrap() = rates;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }
}

#[async_trait]
impl RateSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_symbols(&self) -> Result<SymbolMap, SourceError> {
        self.check()?;
        Ok(self.symbols.lock().unwrap().clone())
    }

    async fn fetch_rates(&self) -> Result<RateMap, SourceError> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.rates.lock().unwrap().clone())
    }
}
