// # Channel Event Source
//
// EventSource fed through an mpsc sender.
//
// Useful when the embedding application already receives interface
// notifications from somewhere else (a management API, a cluster manager
// announcing a virtual-IP move) and only wants the announcing logic.

use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::traits::event_source::{EventSource, EventStream, InterfaceEvent};
use crate::Error;

/// Event source backed by an unbounded channel
///
/// The stream can be subscribed once; it ends when every sender is dropped.
pub struct ChannelEventSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<InterfaceEvent>>>,
}

impl ChannelEventSource {
    /// Create a source and the sender that feeds it
    pub fn new() -> (Self, mpsc::UnboundedSender<InterfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            rx: Mutex::new(Some(rx)),
        };
        (source, tx)
    }
}

impl EventSource for ChannelEventSource {
    fn subscribe(&self) -> Result<EventStream, Error> {
        let rx = self
            .rx
            .lock()
            .map_err(|_| Error::event_source("channel source lock poisoned"))?
            .take()
            .ok_or_else(|| Error::event_source("channel source already subscribed"))?;

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    fn source_name(&self) -> &'static str {
        "channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::EventKind;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn delivers_in_send_order_and_subscribes_once() {
        let (source, tx) = ChannelEventSource::new();
        let stream = source.subscribe().unwrap();
        assert!(source.subscribe().is_err());

        tx.send(InterfaceEvent::new(EventKind::Up, "eth0")).unwrap();
        tx.send(InterfaceEvent::new(EventKind::Down, "eth1")).unwrap();
        drop(tx);

        let events: Vec<_> = stream.collect().await;
        assert_eq!(events[0].interface, "eth0");
        assert_eq!(events[1].kind, EventKind::Down);
        assert_eq!(events.len(), 2);
    }
}
