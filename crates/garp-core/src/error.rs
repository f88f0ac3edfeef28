//! Error types for the gratuitous ARP announcer
//!
//! A missing address binding is not an error (it is `Ok(None)` from the
//! interface query). Everything here is absorbed by the dispatcher and logged;
//! nothing propagates to the event source.

use thiserror::Error;

/// Result type alias for garp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the garp system
#[derive(Error, Debug)]
pub enum Error {
    /// Event source errors (subscription, socket setup)
    #[error("Event source error: {0}")]
    EventSource(String),

    /// Interface lookup errors
    #[error("Interface query error: {0}")]
    InterfaceQuery(String),

    /// Frame transmission failed on an interface
    #[error("Transmit failed on {interface}: {message}")]
    Transmit {
        /// Interface the frame was handed to
        interface: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an event source error
    pub fn event_source(msg: impl Into<String>) -> Self {
        Self::EventSource(msg.into())
    }

    /// Create an interface query error
    pub fn interface_query(msg: impl Into<String>) -> Self {
        Self::InterfaceQuery(msg.into())
    }

    /// Create a transmit error
    pub fn transmit(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transmit {
            interface: interface.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_error_names_interface() {
        let err = Error::transmit("eth0", "network is down");
        assert_eq!(err.to_string(), "Transmit failed on eth0: network is down");
    }

    #[test]
    fn config_error_display() {
        let err = Error::config("Loopback interface name cannot be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: Loopback interface name cannot be empty"
        );
    }
}
