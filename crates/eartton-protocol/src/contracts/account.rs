//! Per-holder account (wallet) proxy.

use crate::config::ProtocolConfig;
use crate::contracts::{dispatch, ContractInstance};
use crate::domain::cell::Cell;
use crate::domain::entities::OutboundMessage;
use crate::domain::operations::Operation;
use crate::domain::state::AccountState;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::ContractError;
use crate::ports::outbound::MessageSender;
use crate::query::QueryClient;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Balances reported by `get_wallet_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletData {
    /// Spendable balance.
    pub balance: Amount,
    /// Holder.
    pub owner: Address,
    /// Issuer of the token.
    pub issuer: Address,
    /// Balance locked by staking.
    pub locked_balance: Amount,
}

/// Staking position reported by `get_staking_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingData {
    /// Locked tokens.
    pub locked_balance: Amount,
    /// Unix time the lock ends.
    pub unlock_time: u32,
}

/// Parameters of a transfer.
///
/// Unset optional fields fall back to defaults when the message is built:
/// the response destination to the sending wallet, the forward amount to
/// [`ProtocolConfig::forward_amount`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Receiving holder.
    pub to: Address,
    /// Tokens to move.
    pub amount: Amount,
    /// Where excess value goes.
    pub response_destination: Option<Address>,
    /// Value forwarded with the notification.
    pub forward_amount: Option<Amount>,
    /// Opaque payload forwarded to the receiver.
    pub forward_payload: Option<Cell>,
    /// Correlation id.
    pub query_id: u64,
}

impl TransferRequest {
    /// Transfer of `amount` to `to` with all defaults.
    #[must_use]
    pub fn new(to: Address, amount: Amount) -> Self {
        Self {
            to,
            amount,
            response_destination: None,
            forward_amount: None,
            forward_payload: None,
            query_id: 0,
        }
    }

    /// Sets the response destination.
    #[must_use]
    pub fn response_destination(mut self, address: Address) -> Self {
        self.response_destination = Some(address);
        self
    }

    /// Sets the forward amount.
    #[must_use]
    pub fn forward_amount(mut self, amount: Amount) -> Self {
        self.forward_amount = Some(amount);
        self
    }

    /// Attaches a forward payload.
    #[must_use]
    pub fn forward_payload(mut self, payload: Cell) -> Self {
        self.forward_payload = Some(payload);
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }
}

/// Proxy over one holder's account program.
#[derive(Clone, Debug)]
pub struct AccountContract {
    instance: ContractInstance,
    config: ProtocolConfig,
}

impl AccountContract {
    /// Account of `owner` under `issuer`, addressed by its initial state.
    ///
    /// This is the address the issuer spawns the account at, so it can be
    /// computed offline. The workchain and message defaults come from
    /// `protocol`.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn create_from_config(
        owner: Address,
        issuer: Address,
        code: Cell,
        protocol: &ProtocolConfig,
    ) -> Result<Self, ContractError> {
        let data = AccountState::initial(owner, issuer).to_cell()?;
        Ok(Self {
            instance: ContractInstance::from_init(protocol.workchain, code, data),
            config: protocol.clone(),
        })
    }

    /// Account at a known `address`.
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        Self {
            instance: ContractInstance::from_address(address),
            config: ProtocolConfig::default(),
        }
    }

    /// Replaces the message defaults.
    #[must_use]
    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    /// Account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.instance.address()
    }

    /// Underlying instance.
    #[must_use]
    pub fn instance(&self) -> &ContractInstance {
        &self.instance
    }

    // -------------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------------

    /// Transfer message. `sender_address` is the fallback response
    /// destination.
    ///
    /// # Errors
    ///
    /// `MissingResponseDestination` if neither the request nor
    /// `sender_address` provides one.
    pub fn transfer_message(
        &self,
        request: &TransferRequest,
        sender_address: Option<Address>,
    ) -> Result<OutboundMessage, ContractError> {
        let response_destination = request
            .response_destination
            .or(sender_address)
            .ok_or(ContractError::MissingResponseDestination)?;
        self.message(&Operation::Transfer {
            query_id: request.query_id,
            amount: request.amount,
            destination: request.to,
            response_destination,
            forward_amount: request
                .forward_amount
                .unwrap_or(self.config.forward_amount),
            has_forward_payload: request.forward_payload.is_some(),
            forward_payload: request.forward_payload.clone(),
        })
    }

    /// Burn message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn burn_message(&self, amount: Amount, query_id: u64) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Burn { query_id, amount })
    }

    /// Stake message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn stake_message(
        &self,
        amount: Amount,
        duration: u32,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Stake {
            query_id,
            amount,
            duration,
        })
    }

    /// Unstake message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn unstake_message(&self, query_id: u64) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Unstake { query_id })
    }

    /// Farming deposit message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn deposit_message(
        &self,
        amount: Amount,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Deposit { query_id, amount })
    }

    /// Farming withdrawal message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn withdraw_message(
        &self,
        amount: Amount,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Withdraw { query_id, amount })
    }

    /// Reward claim message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn claim_message(&self, query_id: u64) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Claim { query_id })
    }

    fn message(&self, op: &Operation) -> Result<OutboundMessage, ContractError> {
        self.instance.operation_message(op, &self.config)
    }

    // -------------------------------------------------------------------------
    // Sends
    // -------------------------------------------------------------------------

    /// Transfers tokens; the response destination defaults to the sender.
    ///
    /// # Errors
    ///
    /// `MissingResponseDestination`, `Codec` for an inconsistent payload,
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_transfer(
        &self,
        sender: &dyn MessageSender,
        request: TransferRequest,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.transfer_message(&request, sender.address())?).await
    }

    /// Burns tokens.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_burn(
        &self,
        sender: &dyn MessageSender,
        amount: Amount,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.burn_message(amount, query_id)?).await
    }

    /// Locks tokens for `duration` seconds.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_stake(
        &self,
        sender: &dyn MessageSender,
        amount: Amount,
        duration: u32,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.stake_message(amount, duration, query_id)?).await
    }

    /// Releases locked tokens.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_unstake(
        &self,
        sender: &dyn MessageSender,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.unstake_message(query_id)?).await
    }

    /// Deposits into the farming pool.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_deposit(
        &self,
        sender: &dyn MessageSender,
        amount: Amount,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.deposit_message(amount, query_id)?).await
    }

    /// Withdraws from the farming pool.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_withdraw(
        &self,
        sender: &dyn MessageSender,
        amount: Amount,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.withdraw_message(amount, query_id)?).await
    }

    /// Claims farming rewards.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(account = %self.address()))]
    pub async fn send_claim(
        &self,
        sender: &dyn MessageSender,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.claim_message(query_id)?).await
    }

    // -------------------------------------------------------------------------
    // Gets
    // -------------------------------------------------------------------------

    /// Balances and ownership.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_wallet_data(&self, client: &QueryClient) -> Result<WalletData, ContractError> {
        let mut result = client
            .invoke(self.address(), "get_wallet_data", Vec::new())
            .await?;
        let data = WalletData {
            balance: result.read_amount()?,
            owner: result.read_address()?,
            issuer: result.read_address()?,
            locked_balance: result.read_amount()?,
        };
        result.finish()?;
        Ok(data)
    }

    /// Staking position.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_staking_data(
        &self,
        client: &QueryClient,
    ) -> Result<StakingData, ContractError> {
        let mut result = client
            .invoke(self.address(), "get_staking_data", Vec::new())
            .await?;
        let data = StakingData {
            locked_balance: result.read_amount()?,
            unlock_time: result.read_number()?,
        };
        result.finish()?;
        Ok(data)
    }
}
