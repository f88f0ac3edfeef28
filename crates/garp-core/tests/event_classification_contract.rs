//! Contract Test: Event Classification
//!
//! Only four notification kinds may ever put a frame on the wire:
//! interface up, interface changed, address changed and peer-notify.
//!
//! If this test fails, someone has:
//! - Added a kind to the trigger set (e.g. announcing on DOWN)
//! - Dropped one of the four triggers

mod common;

use common::*;
use garp_core::traits::{EventKind, InterfaceEvent, OperState};
use garp_core::StaticInterfaceTable;

const NON_TRIGGERS: [EventKind; 21] = [
    EventKind::Down,
    EventKind::Reboot,
    EventKind::Register,
    EventKind::Unregister,
    EventKind::MtuChanged,
    EventKind::GoingDown,
    EventKind::Renamed,
    EventKind::FeaturesChanged,
    EventKind::BondingFailover,
    EventKind::PreUp,
    EventKind::PreTypeChange,
    EventKind::PostTypeChange,
    EventKind::PostInit,
    EventKind::UnregisterFinal,
    EventKind::Release,
    EventKind::Join,
    EventKind::UpperChanged,
    EventKind::ResendIgmp,
    EventKind::PreMtuChange,
    EventKind::InfoDataChanged,
    EventKind::Unknown,
];

const TRIGGERS: [EventKind; 4] = [
    EventKind::Up,
    EventKind::Changed,
    EventKind::AddressChanged,
    EventKind::NotifyPeers,
];

#[tokio::test]
async fn non_trigger_kinds_never_transmit() {
    let table = multi_homed_host().await;
    let transmitter = RecordingTransmitter::new();
    let config = instant_config().with_send_all(true);
    let dispatcher = dispatcher(config, &table, &transmitter);

    for kind in NON_TRIGGERS {
        for name in ["eth0", "eth1", "lo", "missing0"] {
            dispatcher.handle(&InterfaceEvent::new(kind, name)).await;
        }
    }

    assert_eq!(
        transmitter.attempts(),
        0,
        "non-trigger kinds must not transmit, got {:?}",
        transmitter.announced()
    );
}

#[tokio::test]
async fn every_trigger_kind_announces() {
    for kind in TRIGGERS {
        let table = StaticInterfaceTable::new();
        table
            .insert(iface("eth0", 2, OperState::Up), Some(addrs(&["192.0.2.10"])))
            .await;
        let transmitter = RecordingTransmitter::new();
        let dispatcher = dispatcher(instant_config(), &table, &transmitter);

        dispatcher.handle(&InterfaceEvent::new(kind, "eth0")).await;

        assert_eq!(
            transmitter.sent_count(),
            1,
            "{} should announce exactly once",
            kind
        );
    }
}

#[tokio::test]
async fn unknown_interface_is_skipped_quietly() {
    let table = multi_homed_host().await;
    let transmitter = RecordingTransmitter::new();
    let dispatcher = dispatcher(instant_config().with_send_all(true), &table, &transmitter);

    dispatcher
        .handle(&InterfaceEvent::new(EventKind::Up, "wlan9"))
        .await;

    assert_eq!(transmitter.attempts(), 0);
}
