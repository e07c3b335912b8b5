//! Adapters for the supported venues

pub mod bybit;
pub mod deribit;
pub mod okx;

pub use bybit::{BybitAdapter, BybitOptions, DEFAULT_BYBIT_DEPTH};
pub use deribit::{DeribitAdapter, DeribitOptions, UpdateMode, SUBSCRIPTION_REQUEST_ID};
pub use okx::{OkxAdapter, OKX_BOOK_CHANNEL};
