// # Netlink Interface Query
//
// Answers the dispatcher's lookups from fresh RTM_GETLINK / RTM_GETADDR
// dumps. Nothing is cached between calls.
//
// An interface has an IPv4 binding exactly when the kernel has created its
// per-device IPv4 configuration, which shows up as a directory under
// /proc/sys/net/ipv4/conf. A bound interface may still have no addresses.

use async_trait::async_trait;
use garp_core::traits::{AddressBinding, Interface, InterfaceQuery, MacAddr, OperState};
use garp_core::{Error, Result};
use netlink_packet_route::address::nlas::Nla as AddressNla;
use netlink_packet_route::link::nlas::{Nla as LinkNla, State};
use netlink_packet_route::{AddressMessage, LinkMessage, RtnlMessage};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::socket;

/// Where the kernel exposes per-interface IPv4 configuration
pub const IPV4_CONF_ROOT: &str = "/proc/sys/net/ipv4/conf";

/// rtnetlink-backed interface and address lookups
#[derive(Debug, Clone)]
pub struct NetlinkInterfaceQuery {
    conf_root: PathBuf,
}

impl NetlinkInterfaceQuery {
    pub fn new() -> Self {
        Self::with_conf_root(IPV4_CONF_ROOT)
    }

    /// Use a different IPv4 configuration root (for containers that mount
    /// the host's /proc elsewhere)
    pub fn with_conf_root(root: impl Into<PathBuf>) -> Self {
        Self {
            conf_root: root.into(),
        }
    }

    fn has_ipv4_conf(&self, name: &str) -> bool {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return false;
        }
        self.conf_root.join(name).is_dir()
    }
}

impl Default for NetlinkInterfaceQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterfaceQuery for NetlinkInterfaceQuery {
    async fn interface(&self, name: &str) -> Result<Option<Interface>> {
        let interfaces = self.list_interfaces().await?;
        Ok(interfaces.into_iter().find(|i| i.name == name))
    }

    async fn binding(&self, name: &str) -> Result<Option<AddressBinding>> {
        if !self.has_ipv4_conf(name) {
            return Ok(None);
        }

        let Some(interface) = self.interface(name).await? else {
            return Ok(None);
        };

        let replies = blocking_dump(RtnlMessage::GetAddress(AddressMessage::default())).await?;
        let addresses = replies
            .iter()
            .filter_map(|reply| match reply {
                RtnlMessage::NewAddress(address) if address.header.index == interface.index => {
                    ipv4_of(address)
                }
                _ => None,
            })
            .collect();

        Ok(Some(AddressBinding::new(addresses)))
    }

    async fn list_interfaces(&self) -> Result<Vec<Interface>> {
        let replies = blocking_dump(RtnlMessage::GetLink(LinkMessage::default())).await?;
        Ok(replies
            .iter()
            .filter_map(|reply| match reply {
                RtnlMessage::NewLink(link) => interface_of(link),
                _ => None,
            })
            .collect())
    }
}

async fn blocking_dump(request: RtnlMessage) -> Result<Vec<RtnlMessage>> {
    tokio::task::spawn_blocking(move || socket::dump(request))
        .await
        .map_err(|e| Error::interface_query(format!("Netlink dump task failed: {}", e)))?
        .map_err(|e| Error::interface_query(format!("Netlink dump failed: {}", e)))
}

fn interface_of(link: &LinkMessage) -> Option<Interface> {
    let mut name = None;
    let mut hw_addr = MacAddr::ZERO;
    let mut oper_state = OperState::Unknown;

    for nla in &link.nlas {
        match nla {
            LinkNla::IfName(n) => name = Some(n.clone()),
            LinkNla::Address(bytes) => {
                if let Some(mac) = MacAddr::from_slice(bytes) {
                    hw_addr = mac;
                }
            }
            LinkNla::OperState(state) => oper_state = oper_state_of(state),
            _ => {}
        }
    }

    let mut interface = Interface::new(name?, link.header.index, oper_state, hw_addr);
    interface.link_type = link.header.link_layer_type;
    interface.no_arp = link.header.flags & libc::IFF_NOARP as u32 != 0;
    Some(interface)
}

fn oper_state_of(state: &State) -> OperState {
    match state {
        State::Unknown => OperState::Unknown,
        State::NotPresent => OperState::NotPresent,
        State::Down => OperState::Down,
        State::LowerLayerDown => OperState::LowerLayerDown,
        State::Testing => OperState::Testing,
        State::Dormant => OperState::Dormant,
        State::Up => OperState::Up,
        State::Other(code) => OperState::from_code(*code),
        _ => OperState::Unknown,
    }
}

/// The interface's own IPv4 address (IFA_LOCAL, or IFA_ADDRESS when the
/// kernel omits it)
fn ipv4_of(address: &AddressMessage) -> Option<Ipv4Addr> {
    if address.header.family != libc::AF_INET as u8 {
        return None;
    }

    let local = address.nlas.iter().find_map(|nla| match nla {
        AddressNla::Local(bytes) => octets(bytes),
        _ => None,
    });

    local.or_else(|| {
        address.nlas.iter().find_map(|nla| match nla {
            AddressNla::Address(bytes) => octets(bytes),
            _ => None,
        })
    })
}

fn octets(bytes: &[u8]) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = bytes.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use garp_core::traits::interface_query::LINK_TYPE_ETHER;

    #[test]
    fn link_reply_becomes_interface() {
        let mut link = LinkMessage::default();
        link.header.index = 3;
        link.header.link_layer_type = LINK_TYPE_ETHER;
        link.nlas.push(LinkNla::IfName("eth1".to_string()));
        link.nlas.push(LinkNla::Address(vec![2, 0, 0, 0, 0, 3]));
        link.nlas.push(LinkNla::OperState(State::Up));

        let interface = interface_of(&link).unwrap();
        assert_eq!(interface.name, "eth1");
        assert_eq!(interface.index, 3);
        assert_eq!(interface.hw_addr, MacAddr::new([2, 0, 0, 0, 0, 3]));
        assert!(interface.is_up());
        assert!(!interface.no_arp);
    }

    #[test]
    fn noarp_flag_is_carried() {
        let mut link = LinkMessage::default();
        link.header.flags = (libc::IFF_UP | libc::IFF_NOARP) as u32;
        link.nlas.push(LinkNla::IfName("wg0".to_string()));
        link.nlas.push(LinkNla::OperState(State::Unknown));

        let interface = interface_of(&link).unwrap();
        assert!(interface.no_arp);
    }

    #[test]
    fn missing_oper_state_is_unknown() {
        let mut link = LinkMessage::default();
        link.nlas.push(LinkNla::IfName("lo".to_string()));

        let interface = interface_of(&link).unwrap();
        assert_eq!(interface.oper_state, OperState::Unknown);
        assert!(!interface.is_up());
    }

    #[test]
    fn local_address_wins_over_peer() {
        let mut address = AddressMessage::default();
        address.header.family = libc::AF_INET as u8;
        address.nlas.push(AddressNla::Address(vec![10, 0, 0, 2]));
        address.nlas.push(AddressNla::Local(vec![10, 0, 0, 1]));

        assert_eq!(ipv4_of(&address), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn non_ipv4_address_is_ignored() {
        let mut address = AddressMessage::default();
        address.header.family = libc::AF_INET6 as u8;
        address.nlas.push(AddressNla::Local(vec![0; 16]));

        assert_eq!(ipv4_of(&address), None);
    }

    #[test]
    fn binding_follows_ipv4_conf_directory() {
        let root = std::env::temp_dir().join(format!("garp-conf-{}", std::process::id()));
        std::fs::create_dir_all(root.join("eth0")).unwrap();
        let query = NetlinkInterfaceQuery::with_conf_root(&root);

        assert!(query.has_ipv4_conf("eth0"));
        assert!(!query.has_ipv4_conf("dummy0"));
        assert!(!query.has_ipv4_conf(".."));
        assert!(!query.has_ipv4_conf(""));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
