// # garp-core
//
// Core library for the event-driven gratuitous ARP announcer.
//
// ## Architecture Overview
//
// This library reacts to interface state transitions and announces the
// interface's IPv4 addresses on the local segment:
// - **EventSource**: Trait delivering interface-state-change notifications
// - **InterfaceQuery**: Trait for looking up interfaces and their IPv4 bindings
// - **ArpTransmitter**: Trait for placing one ARP frame on the wire
// - **Dispatcher**: Decides whether, when and from which interfaces to announce
// - **Announcer**: Builds and transmits one gratuitous ARP per bound address
// - **GarpEngine**: Subscribes to the event source and drives the dispatcher
//
// ## Design Principles
//
// 1. **Event-Driven**: Push notifications only, never polling
// 2. **Stateless**: Every lookup is re-performed per event
// 3. **Never fails outward**: Handling errors are logged and absorbed
// 4. **Library-First**: All collaborators are injected traits

pub mod traits;
pub mod frame;
pub mod announcer;
pub mod dispatcher;
pub mod engine;
pub mod config;
pub mod error;
pub mod topology;
pub mod source;

// Re-export core types for convenience
pub use traits::{ArpTransmitter, EventSource, InterfaceQuery};
pub use traits::{AddressBinding, EventKind, Interface, InterfaceEvent, MacAddr, OperState};
pub use frame::GratuitousArp;
pub use announcer::Announcer;
pub use dispatcher::Dispatcher;
pub use engine::{EngineEvent, GarpEngine};
pub use config::GarpConfig;
pub use error::{Error, Result};
pub use topology::StaticInterfaceTable;
pub use source::ChannelEventSource;
