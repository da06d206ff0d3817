//! Staking / farming pool proxy.

use crate::config::ProtocolConfig;
use crate::contracts::{dispatch, ContractInstance};
use crate::domain::cell::Cell;
use crate::domain::entities::OutboundMessage;
use crate::domain::operations::Operation;
use crate::domain::stack::StackValue;
use crate::domain::state::PoolState;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::ContractError;
use crate::ports::outbound::MessageSender;
use crate::query::QueryClient;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Pool totals reported by `get_pool_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolData {
    /// Tokens deposited by all users.
    pub total_deposited: Amount,
    /// Reward rate.
    pub reward_rate: u32,
}

/// One user's position reported by `get_user_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Tokens deposited.
    pub deposited: Amount,
    /// Unix time of the last claim.
    pub last_claim_time: u32,
    /// Rewards accrued and not yet claimed.
    pub rewards: Amount,
}

/// Proxy over the staking pool program.
#[derive(Clone, Debug)]
pub struct StakingPoolContract {
    instance: ContractInstance,
    config: ProtocolConfig,
}

impl StakingPoolContract {
    /// Fresh pool for `issuer`'s token, deployable on `protocol.workchain`.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn create_from_config(
        issuer: Address,
        reward_rate: u32,
        code: Cell,
        protocol: &ProtocolConfig,
    ) -> Result<Self, ContractError> {
        let data = PoolState::initial(issuer, reward_rate).to_cell()?;
        Ok(Self {
            instance: ContractInstance::from_init(protocol.workchain, code, data),
            config: protocol.clone(),
        })
    }

    /// Pool already deployed at `address`.
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

    /// Pool address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.instance.address()
    }

    /// Underlying instance.
    #[must_use]
    pub fn instance(&self) -> &ContractInstance {
        &self.instance
    }

    /// Deployment message.
    ///
    /// # Errors
    ///
    /// `NotDeployable` for an address-only pool.
    pub fn deploy_message(&self) -> Result<OutboundMessage, ContractError> {
        self.instance.deploy_message(&self.config)
    }

    /// Reward rate update message.
    ///
    /// # Errors
    ///
    /// Propagates encoding errors.
    pub fn update_reward_rate_message(
        &self,
        reward_rate: u32,
        query_id: u64,
    ) -> Result<OutboundMessage, ContractError> {
        self.instance.operation_message(
            &Operation::UpdateRewardRate {
                query_id,
                reward_rate,
            },
            &self.config,
        )
    }

    /// Deploys the pool.
    ///
    /// # Errors
    ///
    /// `NotDeployable` for an address-only pool, `Transport` on send failure.
    #[instrument(skip(self, sender), fields(pool = %self.address()))]
    pub async fn send_deploy(&self, sender: &dyn MessageSender) -> Result<(), ContractError> {
        dispatch(sender, self.deploy_message()?).await
    }

    /// Sets the reward rate.
    ///
    /// # Errors
    ///
    /// `Transport` on send failure.
    #[instrument(skip(self, sender), fields(pool = %self.address()))]
    pub async fn send_update_reward_rate(
        &self,
        sender: &dyn MessageSender,
        reward_rate: u32,
        query_id: u64,
    ) -> Result<(), ContractError> {
        dispatch(sender, self.update_reward_rate_message(reward_rate, query_id)?).await
    }

    /// Pool totals.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_pool_data(&self, client: &QueryClient) -> Result<PoolData, ContractError> {
        let mut result = client
            .invoke(self.address(), "get_pool_data", Vec::new())
            .await?;
        let data = PoolData {
            total_deposited: result.read_amount()?,
            reward_rate: result.read_number()?,
        };
        result.finish()?;
        Ok(data)
    }

    /// Position of `user`.
    ///
    /// # Errors
    ///
    /// `GetMethodFailed`, `Transport`, or `Codec` for an unexpected result.
    pub async fn get_user_data(
        &self,
        client: &QueryClient,
        user: Address,
    ) -> Result<UserData, ContractError> {
        let mut result = client
            .invoke(
                self.address(),
                "get_user_data",
                vec![StackValue::address(&user)?],
            )
            .await?;
        let data = UserData {
            deposited: result.read_amount()?,
            last_claim_time: result.read_number()?,
            rewards: result.read_amount()?,
        };
        result.finish()?;
        Ok(data)
    }
}
