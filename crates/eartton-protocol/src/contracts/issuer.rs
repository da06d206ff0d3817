//! Issuer (token master) proxy.

use crate::config::{check_basis_points, IssuerConfig, ProtocolConfig};
use crate::contracts::{dispatch, ContractInstance};
use crate::domain::cell::Cell;
use crate::domain::entities::OutboundMessage;
use crate::domain::operations::Operation;
use crate::domain::stack::StackValue;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::ContractError;
use crate::ports::outbound::MessageSender;
use crate::query::QueryClient;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Token parameters reported by `get_eartton_params`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarttonParams {
    /// Transfer burn rate in basis points.
    pub burn_rate: u16,
    /// Staking APR in basis points.
    pub staking_apr: u16,
    /// Tokens reserved for farming rewards.
    pub farming_pool_size: Amount,
    /// Whether token operations are suspended.
    pub paused: bool,
}

/// Proxy over the issuer program.
#[derive(Clone, Debug)]
pub struct IssuerContract {
    instance: ContractInstance,
    config: ProtocolConfig,
}

impl IssuerContract {
    /// Issuer with initial data built from `issuer`, deployable on
    /// `protocol.workchain`. `protocol` also supplies the message defaults.
    ///
    /// # Errors
    ///
    /// `Config` if the parameters are out of range.
    pub fn create_from_config(
        issuer: &IssuerConfig,
        code: Cell,
        protocol: &ProtocolConfig,
    ) -> Result<Self, ContractError> {
        issuer.validate()?;
        let data = issuer.initial_state().to_cell()?;
        Ok(Self {
            instance: ContractInstance::from_init(protocol.workchain, code, data),
            config: protocol.clone(),
        })
    }

    /// Issuer already deployed at `address`.
    #[must_use]
    pub fn from_address(address: Address) -> Self {
        Self {
            instance: ContractInstance::from_address(address),
            config: ProtocolConfig::default(),
        }
    }

    /// Replaces the message defaults. The address is fixed at construction
    /// and keeps its workchain.
    #[must_use]
    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    /// Issuer address.
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

    /// Deployment message.
    ///
    /// # Errors
    ///
    /// `NotDeployable` for an address-only issuer.
    pub fn deploy_message(&self) -> Result<OutboundMessage, ContractError> {
        self.instance.deploy_message(&self.config)
    }

    /// Mint message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn mint_message(
        &self,
        to: Address,
        amount: Amount,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Mint {
            query_id,
            to,
            amount,
        })
    }

    /// Pause message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn pause_message(&self, query_id: u64) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Pause { query_id })
    }

    /// Unpause message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn unpause_message(&self, query_id: u64) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::Unpause { query_id })
    }

    /// Blacklist-add message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn add_to_blacklist_message(
        &self,
        address: Address,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::AddToBlacklist { query_id, address })
    }

    /// Blacklist-remove message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn remove_from_blacklist_message(
        &self,
        address: Address,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.message(&Operation::RemoveFromBlacklist { query_id, address })
    }

    /// Staking APR update message.
    ///
    /// # Errors
    ///
    /// `Config` if `apr` exceeds 10000 basis points, else encoding errors.
    pub fn update_staking_apr_message(
        &self,
        apr: u16,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        check_basis_points("staking_apr", apr)?;
        self.message(&Operation::UpdateStakingApr { query_id, apr })
    }

    /// Burn rate update message.
    ///
    /// # Errors
    ///
    /// `Config` if `burn_rate` exceeds 10000 basis points, else encoding
    /// errors.
    pub fn update_burn_rate_message(
        &self,
        burn_rate: u16,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        check_basis_points("burn_rate", burn_rate)?;
        self.message(&Operation::UpdateBurnRate {
            query_id,
            burn_rate,
        })
    }

    fn message(&self, op: &Operation) -> Result<OutboundMessage, ContractError> {
        self.instance.operation_message(op, &self.config)
    }

    // -------------------------------------------------------------------------
    // Sends
    // -------------------------------------------------------------------------

    /// Deploys the issuer.
    ///
    /// # Errors
    ///
    /// `NotDeployable` for an address-only issuer, `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_deploy(&self, sender: &dyn MessageSender) -> Result<(), ContractError> {
        dispatch(sender, self.deploy_message()?).await
    }

    /// Mints `amount` to the account of `to`.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_mint(
        &self,
        sender: &dyn MessageSender,
        to: Address,
        amount: Amount,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.mint_message(to, amount, query_id)?).await
    }

    /// Suspends token operations.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_pause(
        &self,
        sender: &dyn MessageSender,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.pause_message(query_id)?).await
    }

    /// Resumes token operations.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_unpause(
        &self,
        sender: &dyn MessageSender,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.unpause_message(query_id)?).await
    }

    /// Blacklists `address`.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_add_to_blacklist(
        &self,
        sender: &dyn MessageSender,
        address: Address,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.add_to_blacklist_message(address, query_id)?).await
    }

    /// Lifts the blacklist entry of `address`.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_remove_from_blacklist(
        &self,
        sender: &dyn MessageSender,
        address: Address,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.remove_from_blacklist_message(address, query_id)?).await
    }

    /// Sets the staking APR.
    ///
    /// # Errors
    ///
    /// `Config` if `apr` is out of range, `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_update_staking_apr(
        &self,
        sender: &dyn MessageSender,
        apr: u16,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.update_staking_apr_message(apr, query_id)?).await
    }

    /// Sets the burn rate.
    ///
    /// # Errors
    ///
    /// `Config` if `burn_rate` is out of range, `Transport` on send failure.
    #[instrument(skip(self, sender), fields(issuer = %self.address()))]
    pub async fn send_update_burn_rate(
        &self,
        sender: &dyn MessageSender,
        burn_rate: u16,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.update_burn_rate_message(burn_rate, query_id)?).await
    }

    // -------------------------------------------------------------------------
    // Gets
    // -------------------------------------------------------------------------

    /// Address of the account program of `owner`.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_wallet_address(
        &self,
        client: &QueryClient,
        owner: Address,
    ) -> Result<Address, ContractError> {
        let mut result = client
            .invoke(
                self.address(),
                "get_wallet_address",
                vec![StackValue::address(&owner)?],
            )
            .await?;
        let address = result.read_address()?;
        result.finish()?;
        Ok(address)
    }

    /// Current token parameters.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_eartton_params(
        &self,
        client: &QueryClient,
    ) -> Result<EarttonParams, ContractError> {
        let mut result = client
            .invoke(self.address(), "get_eartton_params", Vec::new())
            .await?;
        let params = EarttonParams {
            burn_rate: result.read_number()?,
            staking_apr: result.read_number()?,
            farming_pool_size: result.read_amount()?,
            paused: result.read_bool()?,
        };
        result.finish()?;
        Ok(params)
    }

    /// Whether `address` is blacklisted.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn is_address_blacklisted(
        &self,
        client: &QueryClient,
        address: Address,
    ) -> Result<bool, ContractError> {
        let mut result = client
            .invoke(
                self.address(),
                "is_address_blacklisted",
                vec![StackValue::address(&address)?],
            )
            .await?;
        let blacklisted = result.read_bool()?;
        result.finish()?;
        Ok(blacklisted)
    }
}
