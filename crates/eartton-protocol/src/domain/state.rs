//! # Initial-State Layouts
//!
//! Bit-exact persistent data of the three programs. The issuer and pool
//! layouts are what the deployer writes into the state-init; the account
//! layout is what the issuer writes when it spawns a holder's account.
//!
//! | Program | Layout |
//! |---------|--------|
//! | Issuer | `total_supply:amount owner:address ^content ^account_code burn_rate:u16 staking_apr:u16 farming_pool_size:amount paused:bit ^blacklist` |
//! | Account | `balance:amount owner:address issuer:address locked_balance:amount unlock_time:u32` |
//! | StakingPool | `total_deposited:amount reward_rate:u32 issuer:address ^users` |

use crate::domain::builder::CellBuilder;
use crate::domain::cell::Cell;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::CodecError;

// =============================================================================
// ISSUER
// =============================================================================

/// Persistent data of the issuer program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerState {
    /// Tokens in circulation.
    pub total_supply: Amount,
    /// Administrator allowed to mint, pause and manage the blacklist.
    pub owner: Address,
    /// Token metadata cell.
    pub content: Cell,
    /// Code of the per-holder account program.
    pub account_code: Cell,
    /// Transfer burn rate in basis points.
    pub burn_rate: u16,
    /// Staking APR in basis points.
    pub staking_apr: u16,
    /// Tokens reserved for farming rewards.
    pub farming_pool_size: Amount,
    /// Whether token operations are suspended.
    pub paused: bool,
    /// Blacklist dictionary root.
    pub blacklist: Cell,
}

impl IssuerState {
    /// Encodes the issuer data cell.
    ///
    /// # Errors
    ///
    /// Propagates builder errors (none occur for this layout).
    pub fn to_cell(&self) -> Result<Cell, CodecError> {
        let mut b = CellBuilder::new();
        b.append_amount(self.total_supply)?
            .append_address(&self.owner)?
            .append_child(self.content.clone())?
            .append_child(self.account_code.clone())?
            .append_uint(u128::from(self.burn_rate), 16)?
            .append_uint(u128::from(self.staking_apr), 16)?
            .append_amount(self.farming_pool_size)?
            .append_bit(self.paused)?
            .append_child(self.blacklist.clone())?;
        Ok(b.finalize())
    }

    /// Decodes an issuer data cell.
    ///
    /// # Errors
    ///
    /// `Underflow`, `SchemaMismatch` or `TrailingData` if the cell does not
    /// have exactly this layout.
    pub fn from_cell(cell: &Cell) -> Result<Self, CodecError> {
        let mut r = cell.reader();
        let state = Self {
            total_supply: r.read_amount()?,
            owner: r.read_address()?,
            content: r.read_child()?,
            account_code: r.read_child()?,
            burn_rate: r.read_uint(16)? as u16,
            staking_apr: r.read_uint(16)? as u16,
            farming_pool_size: r.read_amount()?,
            paused: r.read_bit()?,
            blacklist: r.read_child()?,
        };
        r.ensure_consumed()?;
        Ok(state)
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Persistent data of a per-holder account program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountState {
    /// Spendable balance.
    pub balance: Amount,
    /// Holder.
    pub owner: Address,
    /// Issuer that spawned this account.
    pub issuer: Address,
    /// Balance locked by staking.
    pub locked_balance: Amount,
    /// Unix time the locked balance is released.
    pub unlock_time: u32,
}

impl AccountState {
    /// Fresh account data: zero balances, nothing locked.
    #[must_use]
    pub fn initial(owner: Address, issuer: Address) -> Self {
        Self {
            balance: Amount::ZERO,
            owner,
            issuer,
            locked_balance: Amount::ZERO,
            unlock_time: 0,
        }
    }

    /// Encodes the account data cell.
    ///
    /// # Errors
    ///
    /// Propagates builder errors (none occur for this layout).
    pub fn to_cell(&self) -> Result<Cell, CodecError> {
        let mut b = CellBuilder::new();
        b.append_amount(self.balance)?
            .append_address(&self.owner)?
            .append_address(&self.issuer)?
            .append_amount(self.locked_balance)?
            .append_uint(u128::from(self.unlock_time), 32)?;
        Ok(b.finalize())
    }

    /// Decodes an account data cell.
    ///
    /// # Errors
    ///
    /// `Underflow`, `SchemaMismatch` or `TrailingData` on layout mismatch.
    pub fn from_cell(cell: &Cell) -> Result<Self, CodecError> {
        let mut r = cell.reader();
        let state = Self {
            balance: r.read_amount()?,
            owner: r.read_address()?,
            issuer: r.read_address()?,
            locked_balance: r.read_amount()?,
            unlock_time: r.read_uint(32)? as u32,
        };
        r.ensure_consumed()?;
        Ok(state)
    }
}

// =============================================================================
// STAKING POOL
// =============================================================================

/// Persistent data of the staking pool program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    /// Tokens deposited by all users.
    pub total_deposited: Amount,
    /// Reward rate.
    pub reward_rate: u32,
    /// Issuer whose tokens the pool accepts.
    pub issuer: Address,
    /// Per-user dictionary root.
    pub users: Cell,
}

impl PoolState {
    /// Fresh pool data: nothing deposited, empty user dictionary.
    #[must_use]
    pub fn initial(issuer: Address, reward_rate: u32) -> Self {
        Self {
            total_deposited: Amount::ZERO,
            reward_rate,
            issuer,
            users: Cell::empty(),
        }
    }

    /// Encodes the pool data cell.
    ///
    /// # Errors
    ///
    /// Propagates builder errors (none occur for this layout).
    pub fn to_cell(&self) -> Result<Cell, CodecError> {
        let mut b = CellBuilder::new();
        b.append_amount(self.total_deposited)?
            .append_uint(u128::from(self.reward_rate), 32)?
            .append_address(&self.issuer)?
            .append_child(self.users.clone())?;
        Ok(b.finalize())
    }

    /// Decodes a pool data cell.
    ///
    /// # Errors
    ///
    /// `Underflow`, `SchemaMismatch` or `TrailingData` on layout mismatch.
    pub fn from_cell(cell: &Cell) -> Result<Self, CodecError> {
        let mut r = cell.reader();
        let state = Self {
            total_deposited: r.read_amount()?,
            reward_rate: r.read_uint(32)? as u32,
            issuer: r.read_address()?,
            users: r.read_child()?,
        };
        r.ensure_consumed()?;
        Ok(state)
    }
}

// =============================================================================
// TESTS
// =============================================================================
