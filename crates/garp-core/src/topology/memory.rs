// # Static Interface Table
//
// In-memory implementation of InterfaceQuery.
//
// ## Purpose
//
// Lets an embedding application (or a test) describe interfaces and their
// IPv4 bindings directly, without a kernel behind them. Interfaces are listed
// in insertion order, the same way a kernel lists devices in registration
// order.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::interface_query::{AddressBinding, Interface, InterfaceQuery, OperState};
use crate::Error;

#[derive(Debug, Clone)]
struct Entry {
    interface: Interface,
    binding: Option<AddressBinding>,
}

/// In-memory interface table
///
/// Clones share the same table, so a test can keep one handle to mutate
/// topology while the dispatcher reads through another.
///
/// # Example
///
/// ```rust,no_run
/// use garp_core::topology::StaticInterfaceTable;
/// use garp_core::traits::{Interface, InterfaceQuery, MacAddr, OperState};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let table = StaticInterfaceTable::new();
///
///     let eth0 = Interface::new("eth0", 2, OperState::Up, MacAddr::new([2, 0, 0, 0, 0, 1]));
///     table.insert(eth0, Some(vec!["192.0.2.10".parse()?])).await;
///
///     let binding = table.binding("eth0").await?;
///     assert_eq!(binding.unwrap().addresses().len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaceTable {
    inner: Arc<RwLock<Vec<Entry>>>,
}

impl StaticInterfaceTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an interface
    ///
    /// `addresses: None` models an interface without IPv4 configuration.
    /// A replaced interface keeps its position in the listing.
    pub async fn insert(&self, interface: Interface, addresses: Option<Vec<Ipv4Addr>>) {
        let entry = Entry {
            interface,
            binding: addresses.map(AddressBinding::new),
        };

        let mut guard = self.inner.write().await;
        match guard.iter_mut().find(|e| e.interface.name == entry.interface.name) {
            Some(existing) => *existing = entry,
            None => guard.push(entry),
        }
    }

    /// Remove an interface, returning whether it existed
    pub async fn remove(&self, name: &str) -> bool {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|e| e.interface.name != name);
        guard.len() != before
    }

    /// Change an interface's operational state
    pub async fn set_oper_state(&self, name: &str, state: OperState) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let entry = Self::entry_mut(&mut guard, name)?;
        entry.interface.oper_state = state;
        Ok(())
    }

    /// Replace an interface's addresses (creating the binding if needed)
    pub async fn set_addresses(&self, name: &str, addresses: Vec<Ipv4Addr>) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let entry = Self::entry_mut(&mut guard, name)?;
        entry.binding = Some(AddressBinding::new(addresses));
        Ok(())
    }

    /// Drop an interface's IPv4 configuration entirely
    pub async fn clear_binding(&self, name: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let entry = Self::entry_mut(&mut guard, name)?;
        entry.binding = None;
        Ok(())
    }

    /// Number of interfaces in the table
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the table is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    fn entry_mut<'a>(entries: &'a mut [Entry], name: &str) -> Result<&'a mut Entry, Error> {
        entries
            .iter_mut()
            .find(|e| e.interface.name == name)
            .ok_or_else(|| Error::interface_query(format!("no such interface: {}", name)))
    }
}

#[async_trait]
impl InterfaceQuery for StaticInterfaceTable {
    async fn interface(&self, name: &str) -> Result<Option<Interface>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .iter()
            .find(|e| e.interface.name == name)
            .map(|e| e.interface.clone()))
    }

    async fn binding(&self, name: &str) -> Result<Option<AddressBinding>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .iter()
            .find(|e| e.interface.name == name)
            .and_then(|e| e.binding.clone()))
    }

    async fn list_interfaces(&self) -> Result<Vec<Interface>, Error> {
        // Snapshot under one read guard; the sweep never sees a half-applied update
        let guard = self.inner.read().await;
        Ok(guard.iter().map(|e| e.interface.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MacAddr;

    fn eth(name: &str, index: u32) -> Interface {
        Interface::new(name, index, OperState::Up, MacAddr::new([2, 0, 0, 0, 0, index as u8]))
    }

    #[tokio::test]
    async fn test_listing_keeps_insertion_order() {
        let table = StaticInterfaceTable::new();
        table.insert(eth("eth1", 3), None).await;
        table.insert(eth("lo", 1), None).await;
        table.insert(eth("eth0", 2), None).await;

        let names: Vec<_> = table
            .list_interfaces()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["eth1", "lo", "eth0"]);

        // Replacing keeps the slot
        table.insert(eth("lo", 1), Some(vec![])).await;
        assert_eq!(table.list_interfaces().await.unwrap()[1].name, "lo");
        assert_eq!(table.len().await, 3);
    }

    #[tokio::test]
    async fn test_binding_presence() {
        let table = StaticInterfaceTable::new();
        let addr: Ipv4Addr = "198.51.100.4".parse().unwrap();
        table.insert(eth("eth0", 2), None).await;

        assert_eq!(table.binding("eth0").await.unwrap(), None);
        assert_eq!(table.binding("missing").await.unwrap(), None);

        table.set_addresses("eth0", vec![addr]).await.unwrap();
        let binding = table.binding("eth0").await.unwrap().unwrap();
        assert_eq!(binding.addresses(), &[addr]);

        table.clear_binding("eth0").await.unwrap();
        assert_eq!(table.binding("eth0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mutating_unknown_interface_fails() {
        let table = StaticInterfaceTable::new();
        assert!(table.set_oper_state("eth9", OperState::Up).await.is_err());
        assert!(!table.remove("eth9").await);
        assert!(table.is_empty().await);
    }
}
