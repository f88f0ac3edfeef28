//! Gratuitous announcer
//!
//! Given one interface and its IPv4 binding, sends one gratuitous ARP request
//! per bound address, strictly in order. A failed send is logged and the next
//! address is tried; there is no retry.

use std::sync::Arc;
use tracing::{trace, warn};

use crate::frame::GratuitousArp;
use crate::traits::{AddressBinding, ArpTransmitter, Interface};

/// Outcome of announcing one interface's addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnounceReport {
    /// Frames handed to the transmitter successfully
    pub sent: usize,
    /// Frames whose transmission failed
    pub failed: usize,
}

/// Builds and transmits gratuitous ARP requests
#[derive(Clone)]
pub struct Announcer {
    transmitter: Arc<dyn ArpTransmitter>,
}

impl Announcer {
    /// Create an announcer on top of a transmitter
    pub fn new(transmitter: Arc<dyn ArpTransmitter>) -> Self {
        Self { transmitter }
    }

    /// Announce every address of `binding` from `interface`
    ///
    /// An empty binding sends nothing.
    pub async fn announce(&self, interface: &Interface, binding: &AddressBinding) -> AnnounceReport {
        let mut report = AnnounceReport::default();

        for address in binding.addresses() {
            let frame = GratuitousArp::new(interface.hw_addr, *address);

            match self.transmitter.transmit(interface, &frame).await {
                Ok(()) => {
                    trace!("gratuitous arp for {} sent on [{}]", address, interface.name);
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(
                        "{} failed to send gratuitous arp for {} on [{}]: {}",
                        self.transmitter.transmitter_name(),
                        address,
                        interface.name,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}
