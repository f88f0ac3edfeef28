//! Core traits for the garp system
//!
//! This module defines the collaborator interfaces the core depends on.
//!
//! - [`EventSource`]: Interface-state-change notifications
//! - [`InterfaceQuery`]: Interface and IPv4 binding lookups
//! - [`ArpTransmitter`]: Frame transmission

pub mod event_source;
pub mod interface_query;
pub mod transmitter;

pub use event_source::{EventKind, EventSource, EventStream, InterfaceEvent};
pub use interface_query::{AddressBinding, Interface, InterfaceQuery, MacAddr, OperState};
pub use transmitter::ArpTransmitter;
