//! # Driven Ports (SPI - Outbound)
//!
//! The interfaces the protocol client depends on. Embedders implement these
//! traits to provide:
//! - Message delivery (wallet signing + network submission)
//! - Read-only get-method execution against deployed programs
//!
//! The client adds no retries, ordering or timeouts on top of these calls;
//! whatever the implementation reports is surfaced as
//! [`TransportError`](crate::errors::TransportError).

use crate::domain::entities::OutboundMessage;
use crate::domain::stack::StackValue;
use crate::domain::value_objects::Address;
use crate::errors::TransportError;
use async_trait::async_trait;

// =============================================================================
// SEND BOUNDARY
// =============================================================================

/// Delivers outbound messages on behalf of a signing wallet.
///
/// ## Implementation Notes
///
/// The adapter implementing this trait should:
/// 1. Sign the message with the wallet's key
/// 2. Attach the state-init when present
/// 3. Submit it without waiting for on-ledger execution
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Address of the sending wallet, if known.
    ///
    /// Used as the default response destination of transfers.
    fn address(&self) -> Option<Address>;

    /// Submits one message.
    async fn send_message(&self, message: OutboundMessage) -> Result<(), TransportError>;
}

// =============================================================================
// QUERY BOUNDARY
// =============================================================================

/// Raw result of a get-method invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetMethodOutput {
    /// Program exit code; `0` (or `1`) is success.
    pub exit_code: i32,
    /// Result stack, first value first.
    pub stack: Vec<StackValue>,
}

impl GetMethodOutput {
    /// Successful output carrying `stack`.
    #[must_use]
    pub fn success(stack: Vec<StackValue>) -> Self {
        Self {
            exit_code: 0,
            stack,
        }
    }

    /// Whether the exit code denotes success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.exit_code, 0 | 1)
    }
}

/// Runs read-only get-methods against deployed programs.
#[async_trait]
pub trait GetMethodExecutor: Send + Sync {
    /// Invokes `method` on the program at `address`.
    async fn run_get_method(
        &self,
        address: Address,
        method: &str,
        args: Vec<StackValue>,
    ) -> Result<GetMethodOutput, TransportError>;
}
