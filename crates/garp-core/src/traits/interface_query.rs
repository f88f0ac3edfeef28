// # Interface Query Trait
//
// Defines the interface for looking up network interfaces and the IPv4
// addresses bound to them.
//
// ## Implementations
//
// - Netlink-based (Linux): `garp-netlink` crate
// - In-memory: `garp_core::topology::StaticInterfaceTable`
//
// The core never caches what this trait returns. Each event handling cycle
// asks again.

use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// ARPHRD_ETHER
pub const LINK_TYPE_ETHER: u16 = 1;

/// Link-layer (hardware) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// ff:ff:ff:ff:ff:ff
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// 00:00:00:00:00:00
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    /// Create a MAC address from raw octets
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Build a MAC address from a slice, `None` unless it is exactly 6 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.try_into().ok()?;
        Some(Self(octets))
    }

    /// Raw octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Operational state of an interface (RFC 2863 values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperState {
    #[default]
    Unknown,
    NotPresent,
    Down,
    LowerLayerDown,
    Testing,
    Dormant,
    Up,
}

impl OperState {
    /// Map a raw IF_OPER_* code; anything unrecognised is `Unknown`
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => OperState::NotPresent,
            2 => OperState::Down,
            3 => OperState::LowerLayerDown,
            4 => OperState::Testing,
            5 => OperState::Dormant,
            6 => OperState::Up,
            _ => OperState::Unknown,
        }
    }

    /// Raw IF_OPER_* code
    pub fn code(&self) -> u8 {
        match self {
            OperState::Unknown => 0,
            OperState::NotPresent => 1,
            OperState::Down => 2,
            OperState::LowerLayerDown => 3,
            OperState::Testing => 4,
            OperState::Dormant => 5,
            OperState::Up => 6,
        }
    }
}

/// A network interface as reported by the interface query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Interface name (unique at any instant)
    pub name: String,
    /// Kernel interface index
    pub index: u32,
    /// Link-layer type (ARPHRD_*)
    pub link_type: u16,
    /// Operational state
    pub oper_state: OperState,
    /// Hardware address
    pub hw_addr: MacAddr,
    /// The link does not use ARP (IFF_NOARP)
    pub no_arp: bool,
}

impl Interface {
    /// Create an Ethernet interface record
    pub fn new(name: impl Into<String>, index: u32, oper_state: OperState, hw_addr: MacAddr) -> Self {
        Self {
            name: name.into(),
            index,
            link_type: LINK_TYPE_ETHER,
            oper_state,
            hw_addr,
            no_arp: false,
        }
    }

    /// Whether the interface is operationally up
    pub fn is_up(&self) -> bool {
        self.oper_state == OperState::Up
    }
}

/// IPv4 configuration of an interface
///
/// Present whenever the interface carries IPv4 state at all, even with no
/// addresses assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressBinding {
    addresses: Vec<Ipv4Addr>,
}

impl AddressBinding {
    /// Create a binding with the given addresses (order is preserved)
    pub fn new(addresses: Vec<Ipv4Addr>) -> Self {
        Self { addresses }
    }

    /// Assigned addresses, in the order the network stack lists them
    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }

    /// Whether no address is assigned
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Trait for interface lookup implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Read-only
///
/// Implementations report what the network stack currently holds. They never
/// change interface state, addresses, or routing.
#[async_trait]
pub trait InterfaceQuery: Send + Sync {
    /// Look up a single interface by name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Interface))`: The interface exists
    /// - `Ok(None)`: No such interface
    /// - `Err(Error)`: The lookup itself failed
    async fn interface(&self, name: &str) -> Result<Option<Interface>, crate::Error>;

    /// Resolve the IPv4 binding of an interface
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AddressBinding))`: The interface has IPv4 configuration
    /// - `Ok(None)`: No IPv4 configuration (or no such interface)
    /// - `Err(Error)`: The lookup itself failed
    async fn binding(&self, name: &str) -> Result<Option<AddressBinding>, crate::Error>;

    /// Snapshot of every interface, in the order the network stack lists them
    async fn list_interfaces(&self) -> Result<Vec<Interface>, crate::Error>;
}
