//! A live subscription: one adapter bound to one owned transport

use crate::adapter::VenueAdapter;
use crate::transport::Transport;
use depth_types::{BookFrame, FeedResult, Venue};
use tracing::{debug, info, instrument, warn};

/// Subscription lifecycle over a single connection
///
/// The transport belongs to the feed, so dropping the feed drops the socket
/// and no frame can reach a session after it let go of its feed.
pub struct Feed {
    adapter: Box<dyn VenueAdapter>,
    transport: Box<dyn Transport>,
    subscribed: bool,
    closed: bool,
}

impl Feed {
    pub fn new(adapter: Box<dyn VenueAdapter>, transport: Box<dyn Transport>) -> Self {
        Self {
            adapter,
            transport,
            subscribed: false,
            closed: false,
        }
    }

    /// Connect and send the subscribe message
    #[instrument(skip(self), fields(venue = %self.adapter.venue(), instrument = %self.adapter.instrument()))]
    pub async fn open(&mut self) -> FeedResult<()> {
        self.transport.connect().await?;
        self.transport.send(&self.adapter.subscribe_message()).await?;
        self.subscribed = true;
        info!(endpoint = %self.transport.endpoint(), "Subscribed to book feed");
        Ok(())
    }

    /// Next inbound text frame, `None` once the venue closed the socket
    pub async fn recv(&mut self) -> FeedResult<Option<String>> {
        Ok(self.transport.recv().await?)
    }

    /// Decode a frame with this feed's adapter
    pub fn decode(&self, frame: &str) -> FeedResult<Option<BookFrame>> {
        self.adapter.decode(frame)
    }

    /// Unsubscribe and subscribe again on the same connection
    ///
    /// Venues answer a fresh subscription with a snapshot, which brings a
    /// book that lost continuity back in sync.
    #[instrument(skip(self), fields(venue = %self.adapter.venue(), instrument = %self.adapter.instrument()))]
    pub async fn resubscribe(&mut self) -> FeedResult<()> {
        self.transport.send(&self.adapter.unsubscribe_message()).await?;
        self.transport.send(&self.adapter.subscribe_message()).await?;
        info!("Resubscribed to book feed");
        Ok(())
    }

    /// Unsubscribe (if still connected) and close; later calls do nothing
    #[instrument(skip(self), fields(venue = %self.adapter.venue(), instrument = %self.adapter.instrument()))]
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if !self.transport.is_connected() {
            debug!("Transport already disconnected");
            return;
        }
        if self.subscribed {
            if let Err(e) = self.transport.send(&self.adapter.unsubscribe_message()).await {
                warn!(error = %e, "Failed to send unsubscribe");
            }
            self.subscribed = false;
        }
        if let Err(e) = self.transport.close().await {
            warn!(error = %e, "Failed to close transport");
        }
    }

    pub fn venue(&self) -> Venue {
        self.adapter.venue()
    }

    pub fn adapter(&self) -> &dyn VenueAdapter {
        self.adapter.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
