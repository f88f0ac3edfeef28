// # garpd - Gratuitous ARP Daemon
//
// Thin integration layer: all announcing logic lives in garp-core, all
// kernel access in garp-netlink. This binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Wires the netlink collaborators into the engine
// 4. Runs until SIGTERM/SIGINT
//
// ## Configuration
//
// - `GARP_DEBUG`: Trace every notification and decision (default: false)
// - `GARP_SEND_ALL`: Also announce from every other live interface
//   (default: false)
// - `GARP_DELAY_MS`: Settling delay before the direct announcement, in
//   milliseconds (default: 100)
// - `GARP_LOOPBACK_NAME`: Interface that never sweeps and is never swept
//   (default: lo)
// - `GARP_LOG_LEVEL`: trace, debug, info, warn, error (default: info, or
//   debug when `GARP_DEBUG` is set)
//
// Booleans accept 1/0, true/false, yes/no.
//
// ## Example
//
// ```bash
// export GARP_SEND_ALL=1
// export GARP_DELAY_MS=250
//
// garpd
// ```

use anyhow::{Context, Result};
use garp_core::GarpConfig;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum GarpExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<GarpExitCode> for ExitCode {
    fn from(code: GarpExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    garp: GarpConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut garp = GarpConfig::new();

        if let Some(value) = lookup("GARP_DEBUG") {
            garp = garp.with_debug(parse_bool("GARP_DEBUG", &value)?);
        }
        if let Some(value) = lookup("GARP_SEND_ALL") {
            garp = garp.with_send_all(parse_bool("GARP_SEND_ALL", &value)?);
        }
        if let Some(value) = lookup("GARP_DELAY_MS") {
            let delay = value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GARP_DELAY_MS must be a number of milliseconds. Got: {}", value))?;
            garp = garp.with_garp_delay_ms(delay);
        }
        if let Some(value) = lookup("GARP_LOOPBACK_NAME") {
            garp = garp.with_loopback_name(value.trim());
        }

        let default_level = if garp.debug { "debug" } else { "info" };
        let log_level = lookup("GARP_LOG_LEVEL").unwrap_or_else(|| default_level.to_string());

        Ok(Self { garp, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.garp.validate()?;

        if self.log_level().is_none() {
            anyhow::bail!(
                "GARP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        Ok(())
    }

    fn log_level(&self) -> Option<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => anyhow::bail!("{} must be one of 1/0, true/false, yes/no. Got: {}", key, value),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return GarpExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return GarpExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return GarpExitCode::ConfigError.into();
    }

    info!("Starting garpd daemon");
    info!(
        "Configuration loaded: send_all={}, garp_delay={}ms, loopback={}",
        config.garp.send_all, config.garp.garp_delay_ms, config.garp.loopback_name
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return GarpExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            GarpExitCode::RuntimeError
        } else {
            GarpExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
#[cfg(all(feature = "netlink", target_os = "linux"))]
async fn run_daemon(config: Config) -> Result<()> {
    use garp_core::GarpEngine;
    use garp_netlink::{NetlinkEventSource, NetlinkInterfaceQuery, PacketTransmitter};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    let transmitter =
        PacketTransmitter::new().context("Failed to open AF_PACKET socket (CAP_NET_RAW required)")?;

    let (engine, mut engine_events) = GarpEngine::new(
        Box::new(NetlinkEventSource::new()),
        Arc::new(NetlinkInterfaceQuery::new()),
        Arc::new(transmitter),
        config.garp,
    )?;

    // Drain engine events so the monitor channel never fills
    tokio::spawn(async move {
        while let Some(event) = engine_events.recv().await {
            tracing::trace!("engine event: {:?}", event);
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Signal handling failed, shutting down: {:#}", e),
        }
        let _ = shutdown_tx.send(());
    });

    info!("Ready to announce on interface changes");
    engine.run_with_shutdown(Some(shutdown_rx)).await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Run the daemon (no kernel backend on this build)
#[cfg(not(all(feature = "netlink", target_os = "linux")))]
async fn run_daemon(_config: Config) -> Result<()> {
    anyhow::bail!("garpd needs the netlink backend, which is only available on Linux")
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
