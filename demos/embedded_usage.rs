//! Minimal embedding example for garp-core
//!
//! An application that already knows when interfaces change (a cluster
//! manager moving a virtual IP, say) feeds notifications through a channel,
//! describes the host with the in-memory table and decides itself what
//! "transmit" means. Here frames are only printed.

use garp_core::traits::{ArpTransmitter, EventKind, Interface, InterfaceEvent, OperState};
use garp_core::{
    ChannelEventSource, GarpConfig, GarpEngine, GratuitousArp, MacAddr, Result,
    StaticInterfaceTable,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

/// Transmitter that logs frames instead of sending them
#[derive(Default)]
struct LoggingTransmitter {
    frames: AtomicUsize,
}

#[async_trait::async_trait]
impl ArpTransmitter for LoggingTransmitter {
    async fn transmit(&self, interface: &Interface, frame: &GratuitousArp) -> Result<()> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        println!(
            "[Embedded] {}: who-has {} tell {} ({} bytes from {})",
            interface.name,
            frame.target_protocol_addr(),
            frame.sender_protocol_addr(),
            frame.to_bytes().len(),
            frame.sender_hw_addr(),
        );
        Ok(())
    }

    fn transmitter_name(&self) -> &'static str {
        "logging"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Embedded garp-core Example ===\n");

    // Describe the host
    let table = StaticInterfaceTable::new();
    table
        .insert(
            Interface::new("lo", 1, OperState::Unknown, MacAddr::ZERO),
            Some(vec![Ipv4Addr::LOCALHOST]),
        )
        .await;
    table
        .insert(
            Interface::new("eth0", 2, OperState::Up, MacAddr::new([0x02, 0, 0, 0, 0, 0x02])),
            Some(vec![Ipv4Addr::new(192, 0, 2, 10)]),
        )
        .await;
    table
        .insert(
            Interface::new("eth1", 3, OperState::Down, MacAddr::new([0x02, 0, 0, 0, 0, 0x03])),
            Some(vec![Ipv4Addr::new(198, 51, 100, 7)]),
        )
        .await;

    let (source, events) = ChannelEventSource::new();
    let transmitter = Arc::new(LoggingTransmitter::default());
    let config = GarpConfig::new()
        .with_debug(true)
        .with_send_all(true)
        .with_garp_delay_ms(50);

    println!("1. Creating engine...");
    let (engine, mut engine_rx) = GarpEngine::new(
        Box::new(source),
        Arc::new(table.clone()),
        transmitter.clone(),
        config,
    )?;

    let listener = tokio::spawn(async move {
        while let Some(event) = engine_rx.recv().await {
            println!("[Event] {:?}", event);
        }
    });

    println!("2. Starting engine in background...");
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    println!("3. eth1 comes up");
    table.set_oper_state("eth1", OperState::Up).await?;
    let _ = events.send(InterfaceEvent::new(EventKind::Up, "eth1"));

    println!("4. eth0 goes down (not announced)");
    table.set_oper_state("eth0", OperState::Down).await?;
    let _ = events.send(InterfaceEvent::new(EventKind::Down, "eth0"));

    sleep(Duration::from_millis(300)).await;

    println!("\n5. Stopping engine...");
    let _ = shutdown_tx.send(());
    if let Ok(result) = engine_handle.await {
        result?;
    }
    let _ = tokio::time::timeout(Duration::from_millis(100), listener).await;

    println!("\n=== {} frame(s) announced ===", transmitter.frames.load(Ordering::SeqCst));
    Ok(())
}
