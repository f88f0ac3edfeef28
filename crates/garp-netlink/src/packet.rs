// # AF_PACKET Transmitter
//
// Writes complete Ethernet frames with `sendto` on a raw packet socket,
// addressing each frame by interface index. One socket serves every
// interface, so nothing needs rebinding when interfaces come and go.
//
// The socket is opened with protocol 0 so it receives nothing; `sendto`
// supplies the EtherType per frame. Links flagged IFF_NOARP are skipped
// silently, the same way the kernel's own ARP output treats them.

use async_trait::async_trait;
use garp_core::frame::{ETHER_TYPE_ARP, FRAME_LEN};
use garp_core::traits::{ArpTransmitter, Interface};
use garp_core::{Error, GratuitousArp, Result};
use std::io;
use std::mem::{self, MaybeUninit};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tracing::debug;

/// Raw packet socket transmitter
///
/// Needs CAP_NET_RAW.
#[derive(Debug)]
pub struct PacketTransmitter {
    fd: OwnedFd,
}

impl PacketTransmitter {
    /// Open the packet socket
    pub fn new() -> io::Result<Self> {
        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                0,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }

        // The descriptor is freshly created and owned by nobody else
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        debug!("Opened AF_PACKET socket");
        Ok(Self { fd })
    }

    fn send_frame(&self, index: u32, frame: &[u8; FRAME_LEN]) -> io::Result<()> {
        let addr = link_addr(index, frame);

        let sent = unsafe {
            libc::sendto(
                self.fd.as_raw_fd(),
                frame.as_ptr() as *const libc::c_void,
                frame.len(),
                0,
                &addr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };

        if sent < 0 {
            return Err(io::Error::last_os_error());
        }
        if sent as usize != frame.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", sent, frame.len()),
            ));
        }
        Ok(())
    }
}

/// Link-layer destination for a frame: the interface plus the frame's own
/// destination MAC
fn link_addr(index: u32, frame: &[u8; FRAME_LEN]) -> libc::sockaddr_ll {
    let mut addr: libc::sockaddr_ll = unsafe { MaybeUninit::zeroed().assume_init() };
    addr.sll_family = libc::AF_PACKET as libc::c_ushort;
    addr.sll_protocol = ETHER_TYPE_ARP.to_be();
    addr.sll_ifindex = index as libc::c_int;
    addr.sll_halen = 6;
    addr.sll_addr[..6].copy_from_slice(&frame[..6]);
    addr
}

#[async_trait]
impl ArpTransmitter for PacketTransmitter {
    async fn transmit(&self, interface: &Interface, frame: &GratuitousArp) -> Result<()> {
        if interface.no_arp {
            debug!("[{}] is NOARP, not sending", interface.name);
            return Ok(());
        }

        let bytes = frame.to_bytes();
        self.send_frame(interface.index, &bytes)
            .map_err(|e| Error::transmit(&interface.name, e.to_string()))
    }

    fn transmitter_name(&self) -> &'static str {
        "af_packet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garp_core::MacAddr;
    use garp_core::traits::OperState;
    use std::net::Ipv4Addr;

    #[test]
    fn link_addr_targets_interface_and_broadcast() {
        let frame = GratuitousArp::new(
            MacAddr::new([2, 0, 0, 0, 0, 1]),
            Ipv4Addr::new(192, 0, 2, 1),
        )
        .to_bytes();

        let addr = link_addr(7, &frame);
        assert_eq!(addr.sll_family, libc::AF_PACKET as libc::c_ushort);
        assert_eq!(addr.sll_ifindex, 7);
        assert_eq!(u16::from_be(addr.sll_protocol), ETHER_TYPE_ARP);
        assert_eq!(addr.sll_halen, 6);
        assert_eq!(&addr.sll_addr[..6], &[0xff; 6]);
    }

    #[tokio::test]
    async fn noarp_interface_is_skipped_without_sending() {
        let transmitter = match PacketTransmitter::new() {
            Ok(transmitter) => transmitter,
            // No CAP_NET_RAW in this environment
            Err(_) => return,
        };

        let mut interface = Interface::new("wg0", u32::MAX, OperState::Unknown, MacAddr::ZERO);
        interface.no_arp = true;
        let frame = GratuitousArp::new(MacAddr::ZERO, Ipv4Addr::new(192, 0, 2, 1));

        // Index u32::MAX does not exist, so an actual send would fail
        assert!(transmitter.transmit(&interface, &frame).await.is_ok());
    }
}
