// # Netlink Event Source
//
// Subscribes to RTMGRP_LINK and RTMGRP_IPV4_IFADDR and forwards classified
// notifications through an unbounded channel.
//
// The socket is read on a dedicated thread. The read times out every
// `RECV_POLL_INTERVAL`, so once the stream is dropped the thread notices the
// closed channel and exits with its socket.

use garp_core::traits::{EventSource, EventStream, InterfaceEvent};
use garp_core::Error;
use netlink_packet_core::NetlinkPayload;
use netlink_packet_route::{LinkMessage, RtnlMessage};
use netlink_sys::Socket;
use std::io;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

use crate::classify::LinkCache;
use crate::socket;

/// rtnetlink-backed interface event source
#[derive(Debug, Default)]
pub struct NetlinkEventSource;

impl NetlinkEventSource {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for NetlinkEventSource {
    fn subscribe(&self) -> Result<EventStream, Error> {
        // Bind before seeding so nothing between the dump and the
        // subscription is lost
        let socket = socket::subscription_socket()
            .map_err(|e| Error::event_source(format!("Failed to open netlink socket: {}", e)))?;

        let mut cache = LinkCache::default();
        match socket::dump(RtnlMessage::GetLink(LinkMessage::default())) {
            Ok(links) => cache.seed(&links),
            Err(e) => warn!("Failed to seed link cache, starting empty: {}", e),
        }
        info!("Subscribed to rtnetlink ({} links known)", cache.len());

        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("garp-netlink".to_string())
            .spawn(move || read_events(socket, cache, tx))
            .map_err(|e| Error::event_source(format!("Failed to spawn netlink reader: {}", e)))?;

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    fn source_name(&self) -> &'static str {
        "netlink"
    }
}

fn read_events(socket: Socket, mut cache: LinkCache, tx: mpsc::UnboundedSender<InterfaceEvent>) {
    while !tx.is_closed() {
        let bytes = match socket.recv_from_full() {
            Ok((bytes, _)) => bytes,
            Err(e) if is_transient(&e) => continue,
            Err(e) if e.raw_os_error() == Some(libc::ENOBUFS) => {
                warn!("Netlink receive buffer overrun, notifications were lost");
                continue;
            }
            Err(e) => {
                error!("Netlink receive failed, closing event stream: {}", e);
                return;
            }
        };

        let messages = match socket::parse_messages(&bytes) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Dropping malformed netlink datagram: {}", e);
                continue;
            }
        };

        for message in messages {
            let NetlinkPayload::InnerMessage(inner) = message.payload else {
                continue;
            };

            if let Some(event) = cache.classify(&inner) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    }

    debug!("Netlink reader stopped");
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
