//! Test doubles and common utilities for contract tests
//!
//! The interface topology is described with the in-memory
//! `StaticInterfaceTable`; what goes on the wire is captured by a recording
//! transmitter.

#![allow(dead_code)]

use garp_core::error::Result;
use garp_core::traits::{
    AddressBinding, ArpTransmitter, Interface, InterfaceQuery, MacAddr, OperState,
};
use garp_core::{Announcer, Dispatcher, GarpConfig, GratuitousArp, StaticInterfaceTable};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// One frame captured by the recording transmitter
#[derive(Debug, Clone)]
pub struct SentFrame {
    pub interface: String,
    pub frame: GratuitousArp,
    pub at: Instant,
}

/// A transmitter that records every frame instead of sending it
///
/// Clones share the same log. Addresses listed in `fail_for` are rejected
/// with a transmit error (and not recorded).
#[derive(Clone, Default)]
pub struct RecordingTransmitter {
    sent: Arc<Mutex<Vec<SentFrame>>>,
    attempts: Arc<Mutex<usize>>,
    fail_for: Arc<Mutex<HashSet<Ipv4Addr>>>,
}

impl RecordingTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every transmit of `address` fail
    pub fn fail_for(&self, address: Ipv4Addr) {
        self.fail_for.lock().unwrap().insert(address);
    }

    /// Frames successfully "sent", in order
    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of frames successfully "sent"
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Number of transmit calls, including failed ones
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    /// (interface, announced address) pairs, in order
    pub fn announced(&self) -> Vec<(String, Ipv4Addr)> {
        self.sent()
            .into_iter()
            .map(|s| (s.interface, s.frame.sender_protocol_addr()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ArpTransmitter for RecordingTransmitter {
    async fn transmit(&self, interface: &Interface, frame: &GratuitousArp) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;

        if self
            .fail_for
            .lock()
            .unwrap()
            .contains(&frame.sender_protocol_addr())
        {
            return Err(garp_core::Error::transmit(&interface.name, "injected failure"));
        }

        self.sent.lock().unwrap().push(SentFrame {
            interface: interface.name.clone(),
            frame: *frame,
            at: Instant::now(),
        });
        Ok(())
    }

    fn transmitter_name(&self) -> &'static str {
        "recording"
    }
}

/// An interface query whose every lookup fails
pub struct BrokenQuery;

#[async_trait::async_trait]
impl InterfaceQuery for BrokenQuery {
    async fn interface(&self, _name: &str) -> Result<Option<Interface>> {
        Err(garp_core::Error::interface_query("netlink dump failed"))
    }

    async fn binding(&self, _name: &str) -> Result<Option<AddressBinding>> {
        Err(garp_core::Error::interface_query("netlink dump failed"))
    }

    async fn list_interfaces(&self) -> Result<Vec<Interface>> {
        Err(garp_core::Error::interface_query("netlink dump failed"))
    }
}

/// Deterministic MAC for an interface index
pub fn mac(index: u32) -> MacAddr {
    MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, index as u8])
}

/// Build an Ethernet interface record
pub fn iface(name: &str, index: u32, state: OperState) -> Interface {
    Interface::new(name, index, state, mac(index))
}

/// Parse a list of dotted-quad addresses
pub fn addrs(list: &[&str]) -> Vec<Ipv4Addr> {
    list.iter().map(|a| a.parse().unwrap()).collect()
}

/// Config with no settling delay
pub fn instant_config() -> GarpConfig {
    GarpConfig::new().with_debug(true).with_garp_delay_ms(0)
}

/// Dispatcher wired to a table and a recording transmitter
pub fn dispatcher(
    config: GarpConfig,
    table: &StaticInterfaceTable,
    transmitter: &RecordingTransmitter,
) -> Dispatcher {
    Dispatcher::new(
        config,
        Arc::new(table.clone()),
        Announcer::new(Arc::new(transmitter.clone())),
    )
}

/// A typical multi-homed host, listed in kernel order:
/// lo (oper state unknown, 127.0.0.1), eth0 (up, 2 addrs), eth1 (up, 1 addr),
/// eth2 (down, 1 addr), dummy0 (up, no IPv4)
pub async fn multi_homed_host() -> StaticInterfaceTable {
    let table = StaticInterfaceTable::new();
    table
        .insert(iface("lo", 1, OperState::Unknown), Some(addrs(&["127.0.0.1"])))
        .await;
    table
        .insert(
            iface("eth0", 2, OperState::Up),
            Some(addrs(&["192.0.2.10", "192.0.2.11"])),
        )
        .await;
    table
        .insert(iface("eth1", 3, OperState::Up), Some(addrs(&["198.51.100.7"])))
        .await;
    table
        .insert(iface("eth2", 4, OperState::Down), Some(addrs(&["203.0.113.1"])))
        .await;
    table.insert(iface("dummy0", 5, OperState::Up), None).await;
    table
}
