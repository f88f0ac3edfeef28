// # Event Source Trait
//
// Defines the interface for receiving interface-state-change notifications.
//
// ## Implementations
//
// - Netlink-based (Linux): `garp-netlink` crate
// - Channel-fed: `garp_core::source::ChannelEventSource`
//
// ## Usage
//
// ```rust,ignore
// use garp_core::EventSource;
// use tokio_stream::StreamExt;
//
// let mut events = source.subscribe()?;
// while let Some(event) = events.next().await {
//     println!("{} on {}", event.kind, event.interface);
// }
// ```

use std::fmt;
use std::pin::Pin;
use tokio_stream::Stream;

/// Stream of interface events returned by [`EventSource::subscribe`]
pub type EventStream = Pin<Box<dyn Stream<Item = InterfaceEvent> + Send + 'static>>;

/// Kind of interface notification
///
/// The vocabulary mirrors the network-device notifier kinds. Only four of
/// them trigger an announcement, see [`EventKind::is_trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Up,
    Down,
    Reboot,
    Changed,
    Register,
    Unregister,
    MtuChanged,
    AddressChanged,
    GoingDown,
    Renamed,
    FeaturesChanged,
    BondingFailover,
    PreUp,
    PreTypeChange,
    PostTypeChange,
    PostInit,
    UnregisterFinal,
    Release,
    NotifyPeers,
    Join,
    UpperChanged,
    ResendIgmp,
    PreMtuChange,
    InfoDataChanged,
    /// A notification kind this system has no name for
    Unknown,
}

impl EventKind {
    /// Whether this kind triggers an announcement
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            EventKind::Up | EventKind::Changed | EventKind::AddressChanged | EventKind::NotifyPeers
        )
    }

    /// Display name used in the event trace, `None` for [`EventKind::Unknown`]
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            EventKind::Up => "NETDEV_UP",
            EventKind::Down => "NETDEV_DOWN",
            EventKind::Reboot => "NETDEV_REBOOT",
            EventKind::Changed => "NETDEV_CHANGE",
            EventKind::Register => "NETDEV_REGISTER",
            EventKind::Unregister => "NETDEV_UNREGISTER",
            EventKind::MtuChanged => "NETDEV_CHANGEMTU",
            EventKind::AddressChanged => "NETDEV_CHANGEADDR",
            EventKind::GoingDown => "NETDEV_GOING_DOWN",
            EventKind::Renamed => "NETDEV_CHANGENAME",
            EventKind::FeaturesChanged => "NETDEV_FEAT_CHANGE",
            EventKind::BondingFailover => "NETDEV_BONDING_FAILOVER",
            EventKind::PreUp => "NETDEV_PRE_UP",
            EventKind::PreTypeChange => "NETDEV_PRE_TYPE_CHANGE",
            EventKind::PostTypeChange => "NETDEV_POST_TYPE_CHANGE",
            EventKind::PostInit => "NETDEV_POST_INIT",
            EventKind::UnregisterFinal => "NETDEV_UNREGISTER_FINAL",
            EventKind::Release => "NETDEV_RELEASE",
            EventKind::NotifyPeers => "NETDEV_NOTIFY_PEERS",
            EventKind::Join => "NETDEV_JOIN",
            EventKind::UpperChanged => "NETDEV_CHANGEUPPER",
            EventKind::ResendIgmp => "NETDEV_RESEND_IGMP",
            EventKind::PreMtuChange => "NETDEV_PRECHANGEMTU",
            EventKind::InfoDataChanged => "NETDEV_CHANGEINFODATA",
            EventKind::Unknown => return None,
        };
        Some(name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown NETDEV event"))
    }
}

/// A single interface notification
///
/// Carries only the interface name. The dispatcher looks the interface up
/// again while handling, so nothing here goes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEvent {
    /// What happened
    pub kind: EventKind,
    /// Name of the interface it happened to
    pub interface: String,
}

impl InterfaceEvent {
    /// Create a new interface event
    pub fn new(kind: EventKind, interface: impl Into<String>) -> Self {
        Self {
            kind,
            interface: interface.into(),
        }
    }
}

/// Trait for interface notification sources
///
/// # Behavior
///
/// - `subscribe()` starts delivery; events arrive in the order the host
///   produced them
/// - Dropping the returned stream unsubscribes
/// - Sources deliver notifications, they never decide anything about them
pub trait EventSource: Send + Sync {
    /// Subscribe to interface notifications
    ///
    /// # Returns
    ///
    /// - `Ok(EventStream)`: The live notification stream
    /// - `Err(Error)`: If the subscription could not be set up
    fn subscribe(&self) -> Result<EventStream, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &'static str;
}
