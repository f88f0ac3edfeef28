// # Interface Query Implementations
//
// Kernel-backed lookups live in the `garp-netlink` crate.

pub mod memory;

pub use memory::StaticInterfaceTable;
