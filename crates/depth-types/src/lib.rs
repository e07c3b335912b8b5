//! Shared types for the multi-venue order book engine
//!
//! This crate provides the core type definitions used by every other crate
//! in the workspace. It has no I/O and no async runtime.
//!
//! # Key Types
//!
//! - [`Venue`] - Supported exchanges (OKX, Bybit, Deribit)
//! - [`Symbol`], [`SymbolMapper`] - Canonical `BASE-QUOTE` symbols and their
//!   translation to venue instruments
//! - [`RawLevel`] - A price level exactly as a venue sent it
//! - [`BookFrame`], [`CanonicalUpdate`] - Normalized book data produced by venue adapters
//! - [`FeedError`] - Error taxonomy shared by adapters and sessions

pub mod error;
pub mod level;
pub mod symbol;
pub mod update;
pub mod venue;

// Re-export commonly used types
pub use error::*;
pub use level::*;
pub use symbol::*;
pub use update::*;
pub use venue::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
