//! Configuration types for the gratuitous ARP announcer
//!
//! The configuration is built once at startup and handed to the engine and
//! dispatcher by value. It is never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Main garp configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarpConfig {
    /// Emit a trace line per handled event kind and per branch decision
    #[serde(default)]
    pub debug: bool,

    /// Also announce from every other live interface on each trigger
    #[serde(default)]
    pub send_all: bool,

    /// Settling delay before announcing from the triggering interface (ms)
    #[serde(default = "default_garp_delay_ms")]
    pub garp_delay_ms: u64,

    /// Name of the loopback interface, never used for broadened announcements
    #[serde(default = "default_loopback_name")]
    pub loopback_name: String,

    /// Capacity of the engine's monitoring event channel
    ///
    /// When full, new engine events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl GarpConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            debug: false,
            send_all: false,
            garp_delay_ms: default_garp_delay_ms(),
            loopback_name: default_loopback_name(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Enable or disable the event trace
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable the system-wide sweep
    pub fn with_send_all(mut self, send_all: bool) -> Self {
        self.send_all = send_all;
        self
    }

    /// Set the settling delay in milliseconds
    pub fn with_garp_delay_ms(mut self, garp_delay_ms: u64) -> Self {
        self.garp_delay_ms = garp_delay_ms;
        self
    }

    /// Set the loopback interface name
    pub fn with_loopback_name(mut self, name: impl Into<String>) -> Self {
        self.loopback_name = name.into();
        self
    }

    /// Settling delay as a `Duration`
    pub fn garp_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.garp_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.loopback_name.is_empty() {
            return Err(crate::Error::config("Loopback interface name cannot be empty"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

impl Default for GarpConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_garp_delay_ms() -> u64 {
    100
}

fn default_loopback_name() -> String {
    "lo".to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GarpConfig::default();
        assert!(!config.debug);
        assert!(!config.send_all);
        assert_eq!(config.garp_delay_ms, 100);
        assert_eq!(config.loopback_name, "lo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GarpConfig = serde_json::from_str(r#"{ "send_all": true }"#).unwrap();
        assert!(config.send_all);
        assert_eq!(config.garp_delay_ms, 100);
        assert_eq!(config.loopback_name, "lo");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(GarpConfig::new().with_loopback_name("").validate().is_err());

        let zero_capacity = GarpConfig {
            event_channel_capacity: 0,
            ..GarpConfig::new()
        };
        assert!(zero_capacity.validate().is_err());
    }

    #[test]
    fn any_settling_delay_is_valid() {
        for delay in [0, 100, 60_001, 120_000, u64::MAX] {
            assert!(GarpConfig::new().with_garp_delay_ms(delay).validate().is_ok());
        }
    }
}
