//! # Recording Sender
//!
//! `MessageSender` that keeps every message instead of delivering it.

use crate::domain::entities::OutboundMessage;
use crate::domain::value_objects::Address;
use crate::errors::TransportError;
use crate::ports::outbound::MessageSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// In-memory sender for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSender {
    address: Option<Address>,
    sent: Mutex<Vec<OutboundMessage>>,
    fail_next: Mutex<Option<TransportError>>,
}

impl RecordingSender {
    /// Sender acting for the wallet at `address`.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address: Some(address),
            ..Self::default()
        }
    }

    /// Sender with no known wallet address.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Makes the next send fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Messages accepted so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    /// Most recently accepted message.
    #[must_use]
    pub fn last(&self) -> Option<OutboundMessage> {
        self.sent.lock().last().cloned()
    }

    /// Drains the recorded messages.
    pub fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    fn address(&self) -> Option<Address> {
        self.address
    }

    async fn send_message(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        debug!(
            destination = %message.destination,
            value = %message.value,
            deploy = message.state_init.is_some(),
            "Recorded outbound message"
        );
        self.sent.lock().push(message);
        Ok(())
    }
}
