//! Command handle for a spawned session

use crate::config::{ConfigError, SessionConfig};
use crate::controller::{SessionCommand, SessionController};
use crate::view::BookView;
use depth_types::{Symbol, SymbolMapper, Venue};
use depth_ws::{Connector, WsConnector};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 32;

/// The session task is no longer running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session task has stopped")]
pub struct SessionClosed;

/// Cloneable front end of a session running on its own task
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<BookView>,
}

impl SessionHandle {
    /// Validate `config` and spawn a session on live WebSocket connections
    pub fn spawn(config: SessionConfig) -> Result<(Self, JoinHandle<()>), ConfigError> {
        let connector = Arc::new(WsConnector::new(config.connect_timeout));
        Self::spawn_with(config, connector, None)
    }

    /// Spawn with a custom connector and, optionally, symbol translation
    pub fn spawn_with(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        mapper: Option<Arc<dyn SymbolMapper>>,
    ) -> Result<(Self, JoinHandle<()>), ConfigError> {
        config.validate()?;

        let mut controller = SessionController::new(config, connector);
        if let Some(mapper) = mapper {
            controller = controller.with_mapper(mapper);
        }
        let view = controller.subscribe();
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(controller.run(rx));

        Ok((Self { commands, view }, task))
    }

    /// Switch the session to `venue` / `symbol`
    pub async fn select(&self, venue: Venue, symbol: impl Into<Symbol>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Select {
            venue,
            symbol: symbol.into(),
        })
        .await
    }

    /// Drop the active subscription
    pub async fn unmount(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Unmount).await
    }

    /// Stop the session task
    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Shutdown).await
    }

    /// New receiver of published views
    pub fn subscribe(&self) -> watch::Receiver<BookView> {
        self.view.clone()
    }

    /// Latest published view
    pub fn view(&self) -> BookView {
        self.view.borrow().clone()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }
}
