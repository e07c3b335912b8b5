//! Venue adapter seam
//!
//! An adapter owns everything venue specific about a subscription: where to
//! connect, what to send, and how to turn inbound text into a [`BookFrame`].

use crate::endpoint::Endpoint;
use crate::venues::{BybitAdapter, BybitOptions, DeribitAdapter, DeribitOptions, OkxAdapter};
use depth_types::{BookFrame, FeedResult, Venue};
use std::collections::HashMap;

/// Venue-specific message handling for one instrument
pub trait VenueAdapter: Send + Sync {
    fn venue(&self) -> Venue;

    /// Endpoint the subscription lives on
    fn endpoint(&self) -> Endpoint;

    /// Venue-native instrument identifier
    fn instrument(&self) -> &str;

    fn subscribe_message(&self) -> String;

    fn unsubscribe_message(&self) -> String;

    /// Decode one inbound text frame
    ///
    /// `Ok(None)` covers everything that is not book data: acknowledgements,
    /// heartbeats, pongs and frames for other subscriptions. Malformed frames
    /// and venue error payloads are errors.
    fn decode(&self, frame: &str) -> FeedResult<Option<BookFrame>>;
}

/// Per-venue tuning used when building adapters
#[derive(Debug, Clone, Default)]
pub struct VenueOptions {
    pub bybit: BybitOptions,
    pub deribit: DeribitOptions,
    /// Replaces a venue's production endpoint
    pub endpoints: HashMap<Venue, Endpoint>,
}

impl VenueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bybit(mut self, bybit: BybitOptions) -> Self {
        self.bybit = bybit;
        self
    }

    pub fn with_deribit(mut self, deribit: DeribitOptions) -> Self {
        self.deribit = deribit;
        self
    }

    /// Connect `venue` somewhere other than its production endpoint
    pub fn with_endpoint(mut self, venue: Venue, endpoint: Endpoint) -> Self {
        self.endpoints.insert(venue, endpoint);
        self
    }

    /// Endpoint to use for `venue`
    pub fn endpoint(&self, venue: Venue) -> Endpoint {
        self.endpoints
            .get(&venue)
            .cloned()
            .unwrap_or_else(|| Endpoint::for_venue(venue))
    }
}

/// Build the adapter for an already translated instrument
pub fn build_adapter(venue: Venue, instrument: &str, options: &VenueOptions) -> Box<dyn VenueAdapter> {
    let endpoint = options.endpoint(venue);
    match venue {
        Venue::Okx => Box::new(OkxAdapter::new(instrument, endpoint)),
        Venue::Bybit => Box::new(BybitAdapter::new(instrument, endpoint, options.bybit.clone())),
        Venue::Deribit => Box::new(DeribitAdapter::new(
            instrument,
            endpoint,
            options.deribit.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_adapter_per_venue() {
        let options = VenueOptions::default();
        for venue in Venue::ALL {
            let adapter = build_adapter(venue, "X", &options);
            assert_eq!(adapter.venue(), venue);
            assert_eq!(adapter.endpoint(), Endpoint::for_venue(venue));
            assert_eq!(adapter.instrument(), "X");
        }
    }

    #[test]
    fn test_endpoint_override() {
        let options =
            VenueOptions::new().with_endpoint(Venue::Bybit, Endpoint::Custom("ws://local".into()));
        let adapter = build_adapter(Venue::Bybit, "BTCUSDT", &options);
        assert_eq!(adapter.endpoint().url(), "ws://local");
        assert_eq!(options.endpoint(Venue::Okx), Endpoint::OkxPublic);
    }
}
