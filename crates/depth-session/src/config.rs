//! Session configuration
//!
//! # Example
//!
//! ```
//! use depth_session::SessionConfig;
//! use depth_ws::{DeribitOptions, UpdateMode};
//! use std::time::Duration;
//!
//! let config = SessionConfig::new()
//!     .with_throttle_interval(Duration::from_millis(250))
//!     .with_view_depth(10)
//!     .with_deribit(DeribitOptions::default().with_update_mode(UpdateMode::AlwaysSnapshot));
//! assert!(config.validate().is_ok());
//! ```

use depth_book::MAX_VIEW_DEPTH;
use depth_types::Venue;
use depth_ws::{BybitOptions, DeribitOptions, Endpoint, VenueOptions};
use std::time::Duration;

/// Default publish interval of the book view
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("throttle interval must be greater than zero")]
    ZeroThrottle,

    #[error("invalid view depth: {depth} (supported: 1 to {max})")]
    InvalidViewDepth { depth: usize, max: usize },

    #[error("connection timeout must be at least 1 second")]
    TimeoutTooShort,

    #[error("invalid Bybit depth: {depth} (supported: 1, 50, 200)")]
    InvalidBybitDepth { depth: u32 },

    #[error("invalid Deribit grouped depth: {depth} (supported: 1, 10, 20)")]
    InvalidDeribitDepth { depth: u32 },

    #[error("invalid Deribit interval: {interval} (supported: 100ms, agg2)")]
    InvalidDeribitInterval { interval: String },
}

/// Tuning for a [`SessionController`](crate::SessionController)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Minimum spacing of book publishes
    pub throttle_interval: Duration,
    /// Levels per side in the published view
    pub view_depth: usize,
    pub connect_timeout: Duration,
    /// Resubscribe when a sequence gap or checksum mismatch is detected
    pub resync_on_gap: bool,
    /// Check OKX checksums after every frame
    pub validate_checksum: bool,
    pub venues: VenueOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            view_depth: MAX_VIEW_DEPTH,
            connect_timeout: Duration::from_secs(10),
            resync_on_gap: true,
            validate_checksum: true,
            venues: VenueOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    pub fn with_view_depth(mut self, depth: usize) -> Self {
        self.view_depth = depth;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_resync_on_gap(mut self, enabled: bool) -> Self {
        self.resync_on_gap = enabled;
        self
    }

    pub fn with_checksum_validation(mut self, enabled: bool) -> Self {
        self.validate_checksum = enabled;
        self
    }

    pub fn with_bybit(mut self, options: BybitOptions) -> Self {
        self.venues.bybit = options;
        self
    }

    pub fn with_deribit(mut self, options: DeribitOptions) -> Self {
        self.venues.deribit = options;
        self
    }

    /// Connect `venue` to a non-production endpoint
    pub fn with_endpoint(mut self, venue: Venue, endpoint: Endpoint) -> Self {
        self.venues.endpoints.insert(venue, endpoint);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_interval.is_zero() {
            return Err(ConfigError::ZeroThrottle);
        }

        if self.view_depth == 0 || self.view_depth > MAX_VIEW_DEPTH {
            return Err(ConfigError::InvalidViewDepth {
                depth: self.view_depth,
                max: MAX_VIEW_DEPTH,
            });
        }

        if self.connect_timeout < Duration::from_secs(1) {
            return Err(ConfigError::TimeoutTooShort);
        }

        if ![1, 50, 200].contains(&self.venues.bybit.depth) {
            return Err(ConfigError::InvalidBybitDepth {
                depth: self.venues.bybit.depth,
            });
        }

        let deribit = &self.venues.deribit;
        if let Some(depth) = deribit.grouped_depth {
            if ![1, 10, 20].contains(&depth) {
                return Err(ConfigError::InvalidDeribitDepth { depth });
            }
        }
        if !["100ms", "agg2"].contains(&deribit.interval.as_str()) {
            return Err(ConfigError::InvalidDeribitInterval {
                interval: deribit.interval.clone(),
            });
        }

        Ok(())
    }
}
