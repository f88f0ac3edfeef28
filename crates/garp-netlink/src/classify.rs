//! rtnetlink message classification
//!
//! Notifier kinds are reconstructed from the message type, the link header's
//! change mask, the `IFLA_EVENT` attribute and what was last seen for the
//! same interface index:
//!
//! | message                                      | kind               |
//! |----------------------------------------------|--------------------|
//! | RTM_NEWLINK, change mask all ones            | `Register`         |
//! | RTM_NEWLINK, IFLA_EVENT reboot               | `Reboot`           |
//! | RTM_NEWLINK, IFLA_EVENT features             | `FeaturesChanged`  |
//! | RTM_NEWLINK, IFLA_EVENT bonding failover     | `BondingFailover`  |
//! | RTM_NEWLINK, IFLA_EVENT notify peers         | `NotifyPeers`      |
//! | RTM_NEWLINK, IFLA_EVENT igmp resend          | `ResendIgmp`       |
//! | RTM_NEWLINK, IFLA_EVENT bonding options      | `InfoDataChanged`  |
//! | RTM_NEWLINK, IFF_UP changed, now set         | `Up`               |
//! | RTM_NEWLINK, IFF_UP changed, now clear       | `Down`             |
//! | RTM_NEWLINK, name differs from last seen     | `Renamed`          |
//! | RTM_NEWLINK, link address differs            | `AddressChanged`   |
//! | RTM_NEWLINK, MTU differs                     | `MtuChanged`       |
//! | RTM_NEWLINK, flags, operstate or carrier     | `Changed`          |
//! | RTM_NEWLINK, nothing tracked differs         | (dropped)          |
//! | RTM_DELLINK                                  | `Unregister`       |
//! | RTM_NEWADDR, AF_INET                         | `AddressChanged`   |
//! | RTM_DELADDR, non-IPv4 RTM_NEWADDR            | (dropped)          |

use garp_core::traits::{EventKind, InterfaceEvent};
use netlink_packet_route::link::nlas::{Nla as LinkNla, State};
use netlink_packet_route::{AddressMessage, LinkMessage, RtnlMessage};
use std::collections::HashMap;
use std::ffi::CStr;

const IFF_UP: u32 = libc::IFF_UP as u32;
const AF_INET: u8 = libc::AF_INET as u8;

// IFLA_EVENT values (linux/if_link.h)
const IFLA_EVENT_REBOOT: u32 = 1;
const IFLA_EVENT_FEATURES: u32 = 2;
const IFLA_EVENT_BONDING_FAILOVER: u32 = 3;
const IFLA_EVENT_NOTIFY_PEERS: u32 = 4;
const IFLA_EVENT_IGMP_RESEND: u32 = 5;
const IFLA_EVENT_BONDING_OPTIONS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkSnapshot {
    name: String,
    hw_addr: Option<Vec<u8>>,
    mtu: Option<u32>,
    flags: u32,
    oper_state: Option<State>,
    carrier: Option<u8>,
}

/// Last-seen link attributes per interface index
#[derive(Debug, Default)]
pub(crate) struct LinkCache {
    links: HashMap<u32, LinkSnapshot>,
}

impl LinkCache {
    /// Seed the cache from a link dump
    pub(crate) fn seed(&mut self, dump: &[RtnlMessage]) {
        for message in dump {
            if let RtnlMessage::NewLink(link) = message {
                if let Some(snapshot) = snapshot(link) {
                    self.links.insert(link.header.index, snapshot);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Turn one rtnetlink message into an interface event
    pub(crate) fn classify(&mut self, message: &RtnlMessage) -> Option<InterfaceEvent> {
        match message {
            RtnlMessage::NewLink(link) => self.new_link(link),
            RtnlMessage::DelLink(link) => {
                let index = link.header.index;
                let name = link_name(link)
                    .map(str::to_string)
                    .or_else(|| self.links.get(&index).map(|s| s.name.clone()))?;
                self.links.remove(&index);
                Some(InterfaceEvent::new(EventKind::Unregister, name))
            }
            RtnlMessage::NewAddress(address) => self.new_address(address),
            _ => None,
        }
    }

    fn new_link(&mut self, link: &LinkMessage) -> Option<InterfaceEvent> {
        let header = &link.header;
        let current = snapshot(link)?;
        let previous = self.links.insert(header.index, current.clone());

        let kind = if header.change_mask == u32::MAX {
            EventKind::Register
        } else if let Some(kind) = notifier_event(link) {
            kind
        } else if header.change_mask & IFF_UP != 0 {
            if header.flags & IFF_UP != 0 {
                EventKind::Up
            } else {
                EventKind::Down
            }
        } else {
            match previous {
                Some(prev) if prev.name != current.name => EventKind::Renamed,
                Some(prev) if current.hw_addr.is_some() && prev.hw_addr != current.hw_addr => {
                    EventKind::AddressChanged
                }
                Some(prev) if current.mtu.is_some() && prev.mtu != current.mtu => {
                    EventKind::MtuChanged
                }
                Some(prev)
                    if prev.flags != current.flags
                        || prev.oper_state != current.oper_state
                        || prev.carrier != current.carrier =>
                {
                    EventKind::Changed
                }
                None if header.change_mask != 0 => EventKind::Changed,
                _ => return None,
            }
        };

        Some(InterfaceEvent::new(kind, current.name))
    }

    fn new_address(&mut self, address: &AddressMessage) -> Option<InterfaceEvent> {
        if address.header.family != AF_INET {
            return None;
        }

        let index = address.header.index;
        let name = match self.links.get(&index) {
            Some(snapshot) => snapshot.name.clone(),
            None => index_to_name(index)?,
        };

        Some(InterfaceEvent::new(EventKind::AddressChanged, name))
    }
}

fn link_name(link: &LinkMessage) -> Option<&str> {
    link.nlas.iter().find_map(|nla| match nla {
        LinkNla::IfName(name) => Some(name.as_str()),
        _ => None,
    })
}

fn snapshot(link: &LinkMessage) -> Option<LinkSnapshot> {
    let mut snapshot = LinkSnapshot {
        name: link_name(link)?.to_string(),
        hw_addr: None,
        mtu: None,
        flags: link.header.flags,
        oper_state: None,
        carrier: None,
    };

    for nla in &link.nlas {
        match nla {
            LinkNla::Address(bytes) => snapshot.hw_addr = Some(bytes.clone()),
            LinkNla::Mtu(mtu) => snapshot.mtu = Some(*mtu),
            LinkNla::OperState(state) => snapshot.oper_state = Some(*state),
            LinkNla::Carrier(carrier) => snapshot.carrier = Some(*carrier),
            _ => {}
        }
    }
    Some(snapshot)
}

/// Kind named by the link's IFLA_EVENT attribute, if it carries one
fn notifier_event(link: &LinkMessage) -> Option<EventKind> {
    let code = link.nlas.iter().find_map(|nla| match nla {
        LinkNla::Event(bytes) => {
            let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
            Some(u32::from_ne_bytes(raw))
        }
        _ => None,
    })?;

    match code {
        IFLA_EVENT_REBOOT => Some(EventKind::Reboot),
        IFLA_EVENT_FEATURES => Some(EventKind::FeaturesChanged),
        IFLA_EVENT_BONDING_FAILOVER => Some(EventKind::BondingFailover),
        IFLA_EVENT_NOTIFY_PEERS => Some(EventKind::NotifyPeers),
        IFLA_EVENT_IGMP_RESEND => Some(EventKind::ResendIgmp),
        IFLA_EVENT_BONDING_OPTIONS => Some(EventKind::InfoDataChanged),
        _ => None,
    }
}

/// Resolve an interface index the kernel knows but the cache does not
pub(crate) fn index_to_name(index: u32) -> Option<String> {
    let mut buf = [0 as libc::c_char; libc::IF_NAMESIZE];
    let ptr = unsafe { libc::if_indextoname(index, buf.as_mut_ptr()) };
    if ptr.is_null() {
        return None;
    }

    let name = unsafe { CStr::from_ptr(ptr) };
    Some(name.to_string_lossy().into_owned())
}
