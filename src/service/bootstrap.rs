use log::info;

use crate::currency::{ledger_now, Currency, RateMap, SymbolMap};
use crate::error::{ExchangeError, ExchangeResult};
use crate::source::RateSource;
use crate::store::RateStore;

/// Fills an empty store from the source: one currency per code that has both
/// a name and a rate, plus the first ledger entry. Returns `false` when the
/// store was already seeded.
pub async fn seed_if_empty(
    store: &dyn RateStore,
    source: &dyn RateSource,
) -> ExchangeResult<bool> {
    if store.is_seeded().await? {
        return Ok(false);
    }

    let symbols = source.fetch_symbols().await?;
    let rates = source.fetch_rates().await?;

    let currencies = join_symbols(symbols, &rates);
    if currencies.is_empty() {
        return Err(ExchangeError::ServiceUnavailable(format!(
            "{} returned no currency with both a name and a rate",
            source.name()
        )));
    }

    store.seed(&currencies, ledger_now()).await?;
    info!("seeded {} currencies from {}", currencies.len(), source.name());

    Ok(true)
}

fn join_symbols(symbols: SymbolMap, rates: &RateMap) -> Vec<Currency> {
    symbols
        .into_iter()
        .filter_map(|(code, name)| {
            let rate = *rates.get(&code)?;
            Some(Currency::new(code, name, rate))
        })
        .collect()
}
