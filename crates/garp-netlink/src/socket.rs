//! rtnetlink socket plumbing shared by the event source and the query

use netlink_packet_core::{NetlinkHeader, NetlinkMessage, NetlinkPayload, NLM_F_DUMP, NLM_F_REQUEST};
use netlink_packet_route::RtnlMessage;
use netlink_sys::{protocols::NETLINK_ROUTE, Socket, SocketAddr};
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

/// Multicast group for link state changes
pub(crate) const RTMGRP_LINK: u32 = 0x1;

/// Multicast group for IPv4 address changes
pub(crate) const RTMGRP_IPV4_IFADDR: u32 = 0x10;

/// How often a blocked reader wakes up to check whether anyone still listens
pub(crate) const RECV_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Socket receive buffer, sized for a burst of link flaps
const SOCKET_RECV_BUFFER_SIZE: usize = 256 * 1024;

/// Open a route socket subscribed to link and IPv4 address notifications
pub(crate) fn subscription_socket() -> io::Result<Socket> {
    let mut socket = Socket::new(NETLINK_ROUTE)?;
    socket.bind(&SocketAddr::new(0, RTMGRP_LINK | RTMGRP_IPV4_IFADDR))?;

    set_recv_timeout(&socket, RECV_POLL_INTERVAL)?;
    set_recv_buffer(&socket, SOCKET_RECV_BUFFER_SIZE);

    debug!("Netlink socket bound to RTMGRP_LINK | RTMGRP_IPV4_IFADDR");
    Ok(socket)
}

/// Send a dump request and collect every reply up to NLMSG_DONE
pub(crate) fn dump(request: RtnlMessage) -> io::Result<Vec<RtnlMessage>> {
    let mut socket = Socket::new(NETLINK_ROUTE)?;
    socket.bind_auto()?;
    socket.connect(&SocketAddr::new(0, 0))?;

    let mut header = NetlinkHeader::default();
    header.flags = NLM_F_REQUEST | NLM_F_DUMP;

    let mut packet = NetlinkMessage::new(header, NetlinkPayload::InnerMessage(request));
    packet.finalize();

    let mut buf = vec![0u8; packet.buffer_len()];
    packet.serialize(&mut buf);
    socket.send(&buf, 0)?;

    let mut replies = Vec::new();
    loop {
        let (bytes, _) = socket.recv_from_full()?;

        for message in parse_messages(&bytes)? {
            match message.payload {
                NetlinkPayload::InnerMessage(inner) => replies.push(inner),
                NetlinkPayload::Done(_) => return Ok(replies),
                NetlinkPayload::Error(e) => {
                    return Err(io::Error::other(format!("netlink dump failed: {:?}", e)));
                }
                _ => {}
            }
        }
    }
}

/// Split a datagram into its netlink messages
pub(crate) fn parse_messages(bytes: &[u8]) -> io::Result<Vec<NetlinkMessage<RtnlMessage>>> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let message = NetlinkMessage::<RtnlMessage>::deserialize(&bytes[offset..])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let length = message.header.length as usize;
        if length == 0 {
            break;
        }

        messages.push(message);

        // netlink messages are 4-byte aligned
        offset += (length + 3) & !3;
    }

    Ok(messages)
}

fn set_recv_timeout(socket: &Socket, timeout: Duration) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    let ret = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            &tv as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };

    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn set_recv_buffer(socket: &Socket, size: usize) {
    use std::os::fd::AsRawFd;

    let size = size as libc::c_int;
    let ret = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_RCVBUF,
            &size as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };

    if ret < 0 {
        warn!("Failed to set SO_RCVBUF, using default buffer size");
    }
}
