use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Domain events published by the services after state changes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CustomerRegistered {
        customer_id: i64,
    },
    CustomerLoggedIn {
        customer_id: i64,
    },
    CartItemAdded {
        customer_id: Option<i64>,
        key: String,
    },
    CartUpdated {
        customer_id: i64,
    },
    CartMerged {
        customer_id: i64,
        merged_lines: usize,
    },
    OrderPlaced {
        order_id: i64,
        customer_id: i64,
        total: Decimal,
    },
    WishlistItemAdded {
        customer_id: i64,
        product_id: i64,
    },
    WishlistItemRemoved {
        customer_id: i64,
        entry_id: i64,
    },
    ContactMessageReceived {
        message_id: i64,
    },
}

/// Clonable handle for publishing events onto the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }

    /// Publish an event, logging instead of failing the caller when the
    /// channel is closed. Event delivery is never on a request's critical path.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!(error = %e, "event dropped");
        }
    }
}

/// Background task draining the event channel. Today this only records the
/// stream; downstream consumers hook in here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "event processed");
    }
    info!("event channel closed, processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::CustomerLoggedIn { customer_id: 7 })
            .await
            .unwrap();
        match rx.recv().await {
            Some(Event::CustomerLoggedIn { customer_id }) => assert_eq!(customer_id, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // must not panic or error out
        sender
            .send_or_log(Event::CartUpdated { customer_id: 1 })
            .await;
    }
}
