// # ARP Transmitter Trait
//
// Defines the capability of placing one ARP frame on an interface.
//
// ## Implementations
//
// - AF_PACKET raw socket (Linux): `garp-netlink` crate
//
// Transmitters are single-shot: one call, one frame. They do not retry and
// do not wait for any reply. The announcer logs failures and moves on.

use async_trait::async_trait;

use super::interface_query::Interface;
use crate::frame::GratuitousArp;

/// Trait for ARP frame transmitters
#[async_trait]
pub trait ArpTransmitter: Send + Sync {
    /// Transmit one ARP frame on `interface`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The frame was handed to the network stack
    /// - `Err(Error::Transmit)`: The send failed
    async fn transmit(&self, interface: &Interface, frame: &GratuitousArp) -> Result<(), crate::Error>;

    /// Name of the transmitter (for logging)
    fn transmitter_name(&self) -> &'static str;
}
