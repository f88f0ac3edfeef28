// # Netlink Backend
//
// Linux implementations of the three garp-core collaborators:
//
// - [`NetlinkEventSource`]: rtnetlink multicast subscription (link and IPv4
//   address groups) turned into `InterfaceEvent`s
// - [`NetlinkInterfaceQuery`]: RTM_GETLINK / RTM_GETADDR dumps, plus the
//   per-interface IPv4 configuration directory under /proc
// - [`PacketTransmitter`]: AF_PACKET raw socket writing whole Ethernet frames
//
// ## Platform Support
//
// Everything here needs rtnetlink and AF_PACKET, so it only exists on
// Linux. On other platforms the crate is empty and [`is_supported`] returns
// `false`.
//
// ## Privileges
//
// Subscribing and dumping work unprivileged. Opening the packet socket
// needs CAP_NET_RAW.

#[cfg(target_os = "linux")]
mod classify;
#[cfg(target_os = "linux")]
mod packet;
#[cfg(target_os = "linux")]
mod query;
#[cfg(target_os = "linux")]
mod socket;
#[cfg(target_os = "linux")]
mod source;

#[cfg(target_os = "linux")]
pub use packet::PacketTransmitter;
#[cfg(target_os = "linux")]
pub use query::NetlinkInterfaceQuery;
#[cfg(target_os = "linux")]
pub use source::NetlinkEventSource;

/// Whether this platform has a netlink backend
pub const fn is_supported() -> bool {
    cfg!(target_os = "linux")
}
