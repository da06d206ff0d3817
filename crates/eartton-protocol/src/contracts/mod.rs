//! # Contract Proxies
//!
//! Typed handles over the three deployed programs. A proxy knows its
//! address (and, when built from code and initial data, its deploy
//! payload), turns method calls into [`Operation`]s, encodes them, and hands
//! the resulting [`OutboundMessage`] to a [`MessageSender`]. Get methods go
//! through a [`QueryClient`](crate::query::QueryClient) and decode the result
//! into typed records.
//!
//! | Proxy | Sends | Gets |
//! |-------|-------|------|
//! | [`IssuerContract`] | deploy, mint, pause, unpause, blacklist add/remove, APR, burn rate | wallet address, params, blacklist check |
//! | [`AccountContract`] | transfer, burn, stake, unstake, deposit, withdraw, claim | wallet data, staking data |
//! | [`StakingPoolContract`] | deploy, reward rate | pool data, user data |
//!
//! Proxies are stateless value types: whether the program is deployed yet
//! is not tracked here, and business rules (pause, blacklist, balances) are
//! enforced on the ledger, not by the client.

pub mod account;
pub mod issuer;
pub mod pool;

pub use account::*;
pub use issuer::*;
pub use pool::*;

use crate::config::ProtocolConfig;
use crate::domain::cell::Cell;
use crate::domain::entities::{OutboundMessage, StateInit};
use crate::domain::operations::Operation;
use crate::domain::services::state_init_address;
use crate::domain::value_objects::Address;
use crate::errors::ContractError;
use crate::ports::outbound::MessageSender;
use tracing::{debug, info};

// =============================================================================
// CONTRACT INSTANCE
// =============================================================================

/// What the transport needs to deploy a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployPayload {
    /// Program code.
    pub code: Cell,
    /// Initial data.
    pub data: Cell,
    /// Address the program will live at.
    pub address: Address,
}

/// Address of a program plus, when known, the state-init it derives from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractInstance {
    address: Address,
    init: Option<StateInit>,
}

impl ContractInstance {
    /// Instance whose address is derived from `code` and `data`.
    #[must_use]
    pub fn from_init(workchain: i8, code: Cell, data: Cell) -> Self {
        let init = StateInit::new(code, data);
        Self {
            address: state_init_address(workchain, &init),
            init: Some(init),
        }
    }

    /// Instance of an already known address; cannot be deployed.
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        Self {
            address,
            init: None,
        }
    }

    /// Program address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// State-init, if built from code and data.
    #[must_use]
    pub fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }

    /// Deploy payload, if built from code and data.
    #[must_use]
    pub fn deploy_payload(&self) -> Option<DeployPayload> {
        self.init.as_ref().map(|init| DeployPayload {
            code: init.code.clone(),
            data: init.data.clone(),
            address: self.address,
        })
    }

    /// Encodes `op` into a message addressed to this instance.
    pub(crate) fn operation_message(
        &self,
        op: &Operation,
        config: &ProtocolConfig,
    ) -> Result<OutboundMessage, ContractError> {
        let body = op.encode()?;
        debug!(
            operation = op.name(),
            opcode = ?op.opcode(),
            destination = %self.address,
            query_id = ?op.query_id(),
            "Encoded operation"
        );
        Ok(OutboundMessage {
            destination: self.address,
            value: config.message_value,
            body,
            state_init: None,
            send_mode: config.send_mode,
        })
    }

    /// Builds the deployment message: empty body plus state-init.
    pub(crate) fn deploy_message(
        &self,
        config: &ProtocolConfig,
    ) -> Result<OutboundMessage, ContractError> {
        let init = self
            .init
            .clone()
            .ok_or_else(|| ContractError::NotDeployable(self.address.to_string()))?;
        let body = Operation::Deploy.encode()?;
        info!(destination = %self.address, value = %config.message_value, "Deploy message built");
        Ok(OutboundMessage {
            destination: self.address,
            value: config.message_value,
            body,
            state_init: Some(init),
            send_mode: config.send_mode,
        })
    }
}

/// Hands `message` to `sender`.
pub(crate) async fn dispatch(
    sender: &dyn MessageSender,
    message: OutboundMessage,
) -> Result<(), ContractError> {
    sender.send_message(message).await?;
    Ok(())
}
