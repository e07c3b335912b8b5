//! Throttled order book sessions
//!
//! A session subscribes to one venue's book for one symbol, reconciles the
//! feed into a local book and republishes the top of that book at a bounded
//! rate through a [`tokio::sync::watch`] channel.
//!
//! # Example
//!
//! ```no_run
//! use depth_session::{SessionConfig, SessionHandle};
//! use depth_types::Venue;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (session, _task) = SessionHandle::spawn(SessionConfig::default())?;
//!     let mut views = session.subscribe();
//!
//!     session.select(Venue::Okx, "BTC-USDT").await?;
//!
//!     while views.changed().await.is_ok() {
//!         let view = views.borrow().clone();
//!         if let Some(best) = view.bids.first() {
//!             println!("best bid {} x {}", best.price, best.size);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod handle;
pub mod scheduler;
pub mod view;

// Re-export main types
pub use config::{ConfigError, SessionConfig, DEFAULT_THROTTLE_INTERVAL};
pub use controller::{SessionCommand, SessionController, SessionState};
pub use handle::{SessionClosed, SessionHandle};
pub use scheduler::{Trigger, UpdateScheduler};
pub use view::BookView;
