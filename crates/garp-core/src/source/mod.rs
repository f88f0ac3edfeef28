// # Event Source Implementations
//
// The kernel-backed source lives in the `garp-netlink` crate.

pub mod channel;

pub use channel::ChannelEventSource;
