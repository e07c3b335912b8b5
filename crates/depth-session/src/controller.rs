//! Session controller
//!
//! Owns the lifecycle of one (venue, symbol) subscription and everything that
//! belongs to it: the feed, the book store, sequence tracking and the publish
//! throttle.
//!
//! # State Machine
//!
//! ```text
//! Idle → Connecting → Live → TearingDown → Idle
//! ```
//!
//! All mutation happens on the task that drives the controller, so the book
//! needs no lock. A frame can only reach the store through the active feed,
//! and the feed is dropped at teardown.

use crate::config::SessionConfig;
use crate::scheduler::{Trigger, UpdateScheduler};
use crate::view::BookView;
use depth_book::{BookStore, SequenceTracker};
use depth_types::{DefaultSymbolMapper, FeedError, FeedResult, Symbol, SymbolMapper, Venue};
use depth_ws::{build_adapter, Connector, Feed};
use std::future::pending;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active subscription
    #[default]
    Idle,
    /// Subscription sent, no book data yet
    Connecting,
    /// Book data flowing
    Live,
    /// Releasing the active subscription
    TearingDown,
}

/// Commands accepted by [`SessionController::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Switch to a new venue and symbol
    Select { venue: Venue, symbol: Symbol },
    /// Drop the active subscription and show nothing
    Unmount,
    /// Tear down and stop the task
    Shutdown,
}

pub struct SessionController {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    mapper: Arc<dyn SymbolMapper>,
    store: BookStore,
    scheduler: UpdateScheduler,
    sequence: Option<SequenceTracker>,
    feed: Option<Feed>,
    state: SessionState,
    /// False after an error until the next good frame
    healthy: bool,
    view: watch::Sender<BookView>,
}

impl SessionController {
    pub fn new(config: SessionConfig, connector: Arc<dyn Connector>) -> Self {
        let (view, _) = watch::channel(BookView::default());
        let scheduler = UpdateScheduler::new(config.throttle_interval);
        Self {
            config,
            connector,
            mapper: Arc::new(DefaultSymbolMapper),
            store: BookStore::new(),
            scheduler,
            sequence: None,
            feed: None,
            state: SessionState::Idle,
            healthy: false,
            view,
        }
    }

    /// Replace the symbol translation
    pub fn with_mapper(mut self, mapper: Arc<dyn SymbolMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Receiver of every published view
    pub fn subscribe(&self) -> watch::Receiver<BookView> {
        self.view.subscribe()
    }

    /// Current published view
    pub fn view(&self) -> BookView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    /// When the next deferred publish is due
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Start a session for `venue` / `symbol`, replacing any active one
    ///
    /// The previous session is torn down first and the view is cleared before
    /// anything else happens, so no level of the old book stays visible. An
    /// unsupported pair is published as an error without opening a socket.
    #[instrument(skip(self), fields(venue = %venue, symbol = %symbol))]
    pub async fn select(&mut self, venue: Venue, symbol: Symbol) -> FeedResult<()> {
        self.release().await;

        self.state = SessionState::Connecting;
        self.healthy = false;
        self.view.send_replace(BookView {
            venue: Some(venue),
            symbol: Some(symbol.clone()),
            loading: true,
            ..BookView::default()
        });

        let instrument = match self.mapper.resolve(&symbol, venue) {
            Ok(instrument) => instrument,
            Err(e) => {
                warn!(error = %e, "Pair not available on venue");
                self.fail(&e);
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        let adapter = build_adapter(venue, &instrument, &self.config.venues);
        let transport = self.connector.transport(&adapter.endpoint());
        let mut feed = Feed::new(adapter, transport);

        if let Err(e) = feed.open().await {
            error!(error = %e, "Failed to open feed");
            feed.close().await;
            self.fail(&e);
            self.state = SessionState::Idle;
            return Err(e);
        }

        info!(instrument = %instrument, "Session started");
        self.sequence = Some(SequenceTracker::new(venue));
        self.feed = Some(feed);
        Ok(())
    }

    /// Apply one inbound text frame
    ///
    /// Returns whether the book changed. Errors are published before they are
    /// returned; the subscription and the last good book stay in place.
    pub fn handle_frame(&mut self, text: &str, now: Instant) -> FeedResult<bool> {
        let Some(feed) = self.feed.as_ref() else {
            return Ok(false);
        };
        let venue = feed.venue();

        let frame = match feed.decode(text) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!(venue = %venue, error = %e, "Failed to decode frame");
                self.fail(&e);
                return Err(e);
            }
        };

        if let Some(tracker) = self.sequence.as_mut() {
            if let Err(e) = tracker.observe(frame.is_snapshot, frame.sequence) {
                self.fail(&e);
                return Err(e);
            }
        }

        let changed = self.store.apply_frame(&frame);

        if venue == Venue::Okx && self.config.validate_checksum {
            if let Some(expected) = frame.checksum {
                if let Err(e) = self.store.verify_okx_checksum(expected) {
                    warn!(error = %e, "Book checksum mismatch");
                    if let Some(tracker) = self.sequence.as_mut() {
                        tracker.reset();
                    }
                    self.fail(&e);
                    return Err(e);
                }
            }
        }

        if frame.is_empty() {
            return Ok(changed);
        }

        if self.state != SessionState::Live || !self.healthy {
            if self.state != SessionState::Live {
                debug!(venue = %venue, "First book data received");
            }
            self.state = SessionState::Live;
            self.healthy = true;
            self.view.send_modify(|view| {
                view.connected = true;
                view.loading = false;
                view.error = None;
            });
        }

        if changed && self.scheduler.trigger(now) == Trigger::Fire {
            self.publish_book();
        }
        Ok(changed)
    }

    /// Handle a frame and resubscribe if the book lost continuity
    pub async fn ingest(&mut self, text: &str, now: Instant) {
        if let Err(e) = self.handle_frame(text, now) {
            if e.requires_resync() && self.config.resync_on_gap {
                self.resync().await;
            }
        }
    }

    /// Ask the venue for a fresh snapshot on the current connection
    pub async fn resync(&mut self) {
        let Some(feed) = self.feed.as_mut() else {
            return;
        };
        if let Err(e) = feed.resubscribe().await {
            self.handle_transport_error(e).await;
        }
    }

    /// Publish the deferred book update if it is due
    pub fn on_timer(&mut self, now: Instant) {
        if self.scheduler.poll(now) {
            self.publish_book();
        }
    }

    /// The connection failed or closed underneath the session
    ///
    /// The feed is dropped and the session goes idle. The last book stays
    /// visible next to the error, including changes still waiting on the
    /// throttle.
    #[instrument(skip(self))]
    pub async fn handle_transport_error(&mut self, err: FeedError) {
        error!(error = %err, "Transport error");
        if let Some(mut feed) = self.feed.take() {
            feed.close().await;
        }
        if self.scheduler.is_pending() {
            self.publish_book();
        }
        self.scheduler.cancel();
        self.sequence = None;
        self.state = SessionState::Idle;
        self.fail(&err);
    }

    /// End the active session and publish an empty view
    #[instrument(skip(self))]
    pub async fn teardown(&mut self) {
        self.release().await;
        self.view.send_replace(BookView::default());
    }

    /// Drive the controller until a shutdown command arrives or every
    /// command sender is dropped
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        loop {
            let deadline = self.scheduler.deadline();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Select { venue, symbol }) => {
                        // failures are already published to the view
                        let _ = self.select(venue, symbol).await;
                    }
                    Some(SessionCommand::Unmount) => self.teardown().await,
                    Some(SessionCommand::Shutdown) | None => {
                        self.teardown().await;
                        break;
                    }
                },
                inbound = next_frame(&mut self.feed) => match inbound {
                    Ok(Some(text)) => self.ingest(&text, Instant::now()).await,
                    Ok(None) => self.handle_transport_error(FeedError::ConnectionClosed).await,
                    Err(e) => self.handle_transport_error(e).await,
                },
                _ = wait_until(deadline) => self.on_timer(Instant::now()),
            }
        }
        debug!("Session task stopped");
    }

    async fn release(&mut self) {
        if self.state == SessionState::Idle && self.feed.is_none() {
            self.store.reset();
            self.scheduler.cancel();
            return;
        }

        self.state = SessionState::TearingDown;
        if let Some(mut feed) = self.feed.take() {
            feed.close().await;
        }
        self.scheduler.cancel();
        self.sequence = None;
        self.store.reset();
        self.healthy = false;
        self.state = SessionState::Idle;
    }

    fn publish_book(&mut self) {
        let snapshot = self.store.materialize(self.config.view_depth);
        let stats = self.store.stats();
        self.view.send_modify(|view| {
            view.bids = snapshot.bids;
            view.asks = snapshot.asks;
            view.stats = stats;
        });
    }

    fn fail(&mut self, err: &FeedError) {
        self.healthy = false;
        let message = err.to_string();
        self.view.send_modify(|view| {
            view.connected = false;
            view.loading = false;
            view.error = Some(message);
        });
    }
}

async fn next_frame(feed: &mut Option<Feed>) -> FeedResult<Option<String>> {
    match feed {
        Some(feed) => feed.recv().await,
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
