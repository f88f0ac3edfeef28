//! Gratuitous ARP frame construction
//!
//! A gratuitous ARP is an ARP request (RFC 826) whose sender and target
//! protocol addresses are the same. No peer is targeted: the target hardware
//! address is left zero and the Ethernet frame goes to broadcast.
//!
//! ```text
//!  0                   6                  12      14
//! +-------------------+-------------------+-------+
//! | dst ff:ff:..:ff   | src = sender hw   | 0806  |
//! +----+----+--+--+---+-------+-----+-----+-------+-----+
//! |htype|ptype|hl|pl| oper=1  | sha | spa | tha=0 | tpa |
//! +----+----+--+--+---+-------+-----+-----+-------+-----+
//!  14   16   18 19  20        22    28    32      38    42
//! ```

use std::net::Ipv4Addr;

use crate::traits::MacAddr;

/// Ethernet header length
pub const ETHERNET_HEADER_LEN: usize = 14;
/// ARP payload length for Ethernet/IPv4
pub const ARP_PAYLOAD_LEN: usize = 28;
/// Full frame length handed to the transmitter
pub const FRAME_LEN: usize = ETHERNET_HEADER_LEN + ARP_PAYLOAD_LEN;

/// EtherType for ARP
pub const ETHER_TYPE_ARP: u16 = 0x0806;
/// EtherType for IPv4 (ARP protocol type)
pub const ETHER_TYPE_IPV4: u16 = 0x0800;
/// ARP hardware type for Ethernet
pub const ARP_HW_TYPE_ETHERNET: u16 = 1;
/// ARP request opcode
pub const ARP_OP_REQUEST: u16 = 1;

/// One gratuitous ARP request for a single address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GratuitousArp {
    sender_hw: MacAddr,
    address: Ipv4Addr,
}

impl GratuitousArp {
    /// Announce `address` as owned by `sender_hw`
    pub fn new(sender_hw: MacAddr, address: Ipv4Addr) -> Self {
        Self { sender_hw, address }
    }

    /// ARP operation (always a request)
    pub fn operation(&self) -> u16 {
        ARP_OP_REQUEST
    }

    /// Sender hardware address
    pub fn sender_hw_addr(&self) -> MacAddr {
        self.sender_hw
    }

    /// Target hardware address (unspecified)
    pub fn target_hw_addr(&self) -> MacAddr {
        MacAddr::ZERO
    }

    /// Sender protocol address
    pub fn sender_protocol_addr(&self) -> Ipv4Addr {
        self.address
    }

    /// Target protocol address, identical to the sender's
    pub fn target_protocol_addr(&self) -> Ipv4Addr {
        self.address
    }

    /// Ethernet destination
    pub fn destination(&self) -> MacAddr {
        MacAddr::BROADCAST
    }

    /// Serialize to a complete Ethernet II frame
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];

        frame[0..6].copy_from_slice(&self.destination().octets());
        frame[6..12].copy_from_slice(&self.sender_hw.octets());
        frame[12..14].copy_from_slice(&ETHER_TYPE_ARP.to_be_bytes());

        let arp = &mut frame[ETHERNET_HEADER_LEN..];
        arp[0..2].copy_from_slice(&ARP_HW_TYPE_ETHERNET.to_be_bytes());
        arp[2..4].copy_from_slice(&ETHER_TYPE_IPV4.to_be_bytes());
        arp[4] = 6;
        arp[5] = 4;
        arp[6..8].copy_from_slice(&self.operation().to_be_bytes());
        arp[8..14].copy_from_slice(&self.sender_hw.octets());
        arp[14..18].copy_from_slice(&self.sender_protocol_addr().octets());
        arp[18..24].copy_from_slice(&self.target_hw_addr().octets());
        arp[24..28].copy_from_slice(&self.target_protocol_addr().octets());

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout_matches_rfc826() {
        let hw = MacAddr::new([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        let frame = GratuitousArp::new(hw, Ipv4Addr::new(192, 168, 10, 7)).to_bytes();

        assert_eq!(frame.len(), 42);
        assert_eq!(&frame[0..6], &[0xff; 6]);
        assert_eq!(&frame[6..12], &hw.octets());
        assert_eq!(&frame[12..14], &[0x08, 0x06]);
        assert_eq!(&frame[14..22], &[0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01]);
        assert_eq!(&frame[22..28], &hw.octets());
        assert_eq!(&frame[28..32], &[192, 168, 10, 7]);
        assert_eq!(&frame[32..38], &[0; 6]);
        assert_eq!(&frame[38..42], &[192, 168, 10, 7]);
    }

    #[test]
    fn sender_and_target_protocol_address_match() {
        let arp = GratuitousArp::new(MacAddr::ZERO, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(arp.sender_protocol_addr(), arp.target_protocol_addr());
        assert_eq!(arp.operation(), ARP_OP_REQUEST);
    }
}
