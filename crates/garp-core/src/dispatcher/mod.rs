//! Event dispatcher
//!
//! Decides, for each interface notification, whether to announce and from
//! which interfaces.
//!
//! ## Decision Flow
//!
//! ```text
//! event ── trigger kind? ──no──────────────────────────────┐
//!              │yes                                        │
//!              ▼                                           │
//!     binding(dev_n)? ──none── "not in dev, skip" ─────────┤
//!              │                                           │
//!              ▼                                           │
//!     dev_n up? ──yes── sleep(garp_delay) ── announce(dev_n)
//!              │                                           │
//!              ▼                                           │
//!     send_all? ──no───────────────────────────────────────┤
//!              │                                           │
//!     dev_n is loopback? ──yes─────────────────────────────┤
//!              │                                           │
//!              ▼                                           ▼
//!     sweep every interface:                    "got NETDEV_<KIND>"
//!       skip loopback, skip unbound,
//!       announce if up
//! ```
//!
//! The triggering interface is announced by the direct path and, when it
//! shows up in the sweep, once more. Both announcements are intentional
//! observable behavior and are kept.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::announcer::Announcer;
use crate::config::GarpConfig;
use crate::traits::{Interface, InterfaceEvent, InterfaceQuery};

/// Event dispatcher
///
/// Holds no mutable state. Concurrent `handle` calls are safe; the engine
/// still serializes them to keep delivery order.
pub struct Dispatcher {
    config: GarpConfig,
    query: Arc<dyn InterfaceQuery>,
    announcer: Announcer,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(config: GarpConfig, query: Arc<dyn InterfaceQuery>, announcer: Announcer) -> Self {
        Self {
            config,
            query,
            announcer,
        }
    }

    /// The configuration this dispatcher was built with
    pub fn config(&self) -> &GarpConfig {
        &self.config
    }

    /// Handle one interface notification
    ///
    /// Never fails: lookup and transmit errors are logged and the affected
    /// interface is skipped.
    pub async fn handle(&self, event: &InterfaceEvent) {
        if event.kind.is_trigger() {
            self.dispatch(event).await;
        }

        if self.config.debug {
            match event.kind.name() {
                Some(name) => debug!("got {}", name),
                None => debug!("got unknown NETDEV event"),
            }
        }
    }

    async fn dispatch(&self, event: &InterfaceEvent) {
        let name = event.interface.as_str();

        let Some(binding) = self.resolve_binding(name).await else {
            self.trace(format_args!("not in dev, skip"));
            return;
        };

        let origin = match self.query.interface(name).await {
            Ok(Some(interface)) => interface,
            Ok(None) => {
                self.trace(format_args!("[{}] vanished, skip", name));
                return;
            }
            Err(e) => {
                warn!("Failed to look up [{}]: {}", name, e);
                return;
            }
        };

        if origin.is_up() {
            tokio::time::sleep(self.config.garp_delay()).await;

            self.trace(format_args!("send gratuitous arp from [{}]", origin.name));
            self.announcer.announce(&origin, &binding).await;
        }

        if !self.config.send_all {
            return;
        }

        if origin.name == self.config.loopback_name {
            self.trace(format_args!("notification from {}, skip", self.config.loopback_name));
            return;
        }

        self.sweep(&origin).await;
    }

    /// Announce from every up, bound, non-loopback interface
    async fn sweep(&self, origin: &Interface) {
        let interfaces = match self.query.list_interfaces().await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!("Failed to list interfaces for sweep from [{}]: {}", origin.name, e);
                return;
            }
        };

        for dev in &interfaces {
            self.trace(format_args!(
                "found [{}], notification from [{}]",
                dev.name, origin.name
            ));

            if dev.is_up() {
                self.trace(format_args!(
                    "[{}] type [{}] state [{}] is up",
                    dev.name,
                    dev.link_type,
                    dev.oper_state.code()
                ));
            } else {
                self.trace(format_args!(
                    "[{}] type [{}] state [{}] unknown oper state",
                    dev.name,
                    dev.link_type,
                    dev.oper_state.code()
                ));
            }

            if dev.name == self.config.loopback_name {
                self.trace(format_args!("skip {}", self.config.loopback_name));
                continue;
            }

            let Some(binding) = self.resolve_binding(&dev.name).await else {
                self.trace(format_args!("not in dev"));
                continue;
            };

            if dev.is_up() {
                self.announcer.announce(dev, &binding).await;
            }
        }
    }

    /// Look up a binding, folding lookup failures into "no binding"
    async fn resolve_binding(&self, name: &str) -> Option<crate::traits::AddressBinding> {
        match self.query.binding(name).await {
            Ok(binding) => binding,
            Err(e) => {
                warn!("Failed to resolve IPv4 binding of [{}]: {}", name, e);
                None
            }
        }
    }

    fn trace(&self, message: std::fmt::Arguments<'_>) {
        if self.config.debug {
            debug!("{}", message);
        }
    }
}
