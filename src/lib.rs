//! Currency exchange backend.
//!
//! Keeps a table of current rates seeded and refreshed from an external
//! source, records every successful refresh in an append-only ledger, and
//! converts amounts between any two known currencies.

pub mod api;
pub mod config;
pub mod currency;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod store;

pub use error::{ExchangeError, ExchangeResult};
