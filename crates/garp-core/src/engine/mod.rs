//! Core garp engine
//!
//! The GarpEngine is responsible for:
//! - Subscribing to the interface event source (start)
//! - Feeding every notification to the dispatcher, in delivery order
//! - Dropping the subscription on shutdown (stop)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ EventSource │─── InterfaceEvent ───┐
//! └─────────────┘                      │
//!                                      ▼
//!                             ┌──────────────┐
//!                             │  GarpEngine  │
//!                             └──────────────┘
//!                                      │
//!                                      ▼
//!                             ┌──────────────┐      ┌────────────────┐
//!                             │  Dispatcher  │─────▶│ InterfaceQuery │
//!                             └──────────────┘      └────────────────┘
//!                                      │
//!                                      ▼
//!                             ┌──────────────┐      ┌────────────────┐
//!                             │  Announcer   │─────▶│ ArpTransmitter │
//!                             └──────────────┘      └────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Events are handled one at a time on the engine's task. The settling delay
//! is an async sleep, so it parks only this loop. A shutdown request is
//! observed between events; an event already being handled runs to the end.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::announcer::Announcer;
use crate::config::GarpConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::traits::{ArpTransmitter, EventKind, EventSource, InterfaceQuery};

/// Events emitted by the GarpEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Subscribed to the event source
    Started {
        source: &'static str,
    },

    /// A notification was taken off the stream and handed to the dispatcher
    EventReceived {
        kind: EventKind,
        interface: String,
    },

    /// Engine stopped and unsubscribed
    Stopped {
        reason: String,
    },
}

/// Core garp engine
///
/// ## Lifecycle
///
/// 1. Create with [`GarpEngine::new()`]
/// 2. Start with [`GarpEngine::run()`]
/// 3. Engine runs until a shutdown signal arrives or the source closes
/// 4. Drop to cleanup
pub struct GarpEngine {
    /// Source of interface notifications
    event_source: Box<dyn EventSource>,

    /// Announcement policy
    dispatcher: Dispatcher,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl GarpEngine {
    /// Create a new garp engine
    ///
    /// # Parameters
    ///
    /// - `event_source`: Interface notification source
    /// - `query`: Interface and IPv4 binding lookups
    /// - `transmitter`: ARP frame transmitter
    /// - `config`: garp configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        event_source: Box<dyn EventSource>,
        query: Arc<dyn InterfaceQuery>,
        transmitter: Arc<dyn ArpTransmitter>,
        config: GarpConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let announcer = Announcer::new(transmitter);
        let engine = Self {
            event_source,
            dispatcher: Dispatcher::new(config, query, announcer),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// The dispatcher driven by this engine
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the engine until Ctrl-C
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: The event source could not be subscribed
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine until `shutdown_rx` fires (or Ctrl-C when `None`)
    ///
    /// Daemons that install their own signal handling use this entry point.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        let mut events = self.event_source.subscribe()?;
        let source = self.event_source.source_name();
        let config = self.dispatcher.config();

        info!(
            "garp engine started (source: {}, send_all: {}, garp_delay: {}ms)",
            source, config.send_all, config.garp_delay_ms
        );
        self.emit_event(EngineEvent::Started { source });

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else {
                        warn!("Event source {} closed", source);
                        break "Event source closed";
                    };

                    self.emit_event(EngineEvent::EventReceived {
                        kind: event.kind,
                        interface: event.interface.clone(),
                    });
                    self.dispatcher.handle(&event).await;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break "Shutdown signal";
                }
            }
        };

        // Dropping the stream is the unsubscribe
        drop(events);
        info!("garp engine stopped, unsubscribed from {}", source);
        self.emit_event(EngineEvent::Stopped {
            reason: reason.to_string(),
        });

        Ok(())
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // A slow or absent monitor must not stall handling
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Engine event channel full, dropping event");
        }
    }
}
