//! # Operation Registry
//!
//! The closed set of request messages the three programs accept, bound to
//! their opcodes and wire layouts.
//!
//! Every opcode-bearing body starts with the same header:
//!
//! ```text
//! [opcode: 32][query_id: 64][operation fields...]
//! ```
//!
//! `query_id` is the caller's correlation id, echoed back by the program and
//! never interpreted here. The deploy message is the empty body.
//!
//! Opcode values are wire protocol: changing one is a breaking change and
//! the golden tests below pin every value.

use crate::domain::builder::CellBuilder;
use crate::domain::cell::Cell;
use crate::domain::entities::ProgramKind;
use crate::domain::reader::CellReader;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::CodecError;

// =============================================================================
// OPCODES
// =============================================================================

/// Opcode values, one per operation.
pub mod opcodes {
    /// Issuer: mint to a holder.
    pub const MINT: u32 = 0x1674_b0a0;
    /// Issuer: suspend token operations.
    pub const PAUSE: u32 = 0x5678_1234;
    /// Issuer: resume token operations.
    pub const UNPAUSE: u32 = 0x4321_8765;
    /// Issuer: blacklist an address.
    pub const ADD_TO_BLACKLIST: u32 = 0xaabb_ccdd;
    /// Issuer: lift a blacklist entry.
    pub const REMOVE_FROM_BLACKLIST: u32 = 0xddcc_bbaa;
    /// Issuer: set staking APR.
    pub const UPDATE_STAKING_APR: u32 = 0x1111_2222;
    /// Issuer: set burn rate.
    pub const UPDATE_BURN_RATE: u32 = 0x2222_1111;
    /// Account: transfer to another holder.
    pub const TRANSFER: u32 = 0x0f8a_7ea5;
    /// Account: burn tokens.
    pub const BURN: u32 = 0x595f_07bc;
    /// Account: lock tokens for a duration.
    pub const STAKE: u32 = 0x1234_5678;
    /// Account: release locked tokens.
    pub const UNSTAKE: u32 = 0x8765_4321;
    /// Account: deposit into the farming pool.
    pub const DEPOSIT: u32 = 0xabcd_ef01;
    /// Account: withdraw from the farming pool.
    pub const WITHDRAW: u32 = 0x10fe_dcba;
    /// Account: claim farming rewards.
    pub const CLAIM: u32 = 0x9876_5432;
    /// Pool: set reward rate.
    pub const UPDATE_REWARD_RATE: u32 = 0x3333_4444;
}

const OPCODE_BITS: usize = 32;
const QUERY_ID_BITS: usize = 64;

// =============================================================================
// SCHEMA TABLE
// =============================================================================

/// Wire kind of one operation field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-width unsigned integer.
    Uint(usize),
    /// Variable-length amount.
    Amount,
    /// Standard address.
    Address,
    /// Single bit.
    Bit,
    /// Child reference.
    Child,
    /// Child reference present iff the preceding flag bit is set.
    OptionalChild,
}

/// One field of an operation layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Wire kind.
    pub kind: FieldKind,
}

/// Registry entry: opcode, target program and field layout after the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationSchema {
    /// Operation name.
    pub name: &'static str,
    /// 32-bit opcode.
    pub opcode: u32,
    /// Program that accepts the operation.
    pub target: ProgramKind,
    /// Fields following `[opcode][query_id]`.
    pub fields: &'static [FieldSpec],
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Every opcode-bearing operation.
pub const REGISTRY: &[OperationSchema] = &[
    OperationSchema {
        name: "mint",
        opcode: opcodes::MINT,
        target: ProgramKind::Issuer,
        fields: &[
            field("to", FieldKind::Address),
            field("amount", FieldKind::Amount),
            field("issuer_message", FieldKind::Child),
        ],
    },
    OperationSchema {
        name: "pause",
        opcode: opcodes::PAUSE,
        target: ProgramKind::Issuer,
        fields: &[],
    },
    OperationSchema {
        name: "unpause",
        opcode: opcodes::UNPAUSE,
        target: ProgramKind::Issuer,
        fields: &[],
    },
    OperationSchema {
        name: "add_to_blacklist",
        opcode: opcodes::ADD_TO_BLACKLIST,
        target: ProgramKind::Issuer,
        fields: &[field("address", FieldKind::Address)],
    },
    OperationSchema {
        name: "remove_from_blacklist",
        opcode: opcodes::REMOVE_FROM_BLACKLIST,
        target: ProgramKind::Issuer,
        fields: &[field("address", FieldKind::Address)],
    },
    OperationSchema {
        name: "update_staking_apr",
        opcode: opcodes::UPDATE_STAKING_APR,
        target: ProgramKind::Issuer,
        fields: &[field("apr", FieldKind::Uint(16))],
    },
    OperationSchema {
        name: "update_burn_rate",
        opcode: opcodes::UPDATE_BURN_RATE,
        target: ProgramKind::Issuer,
        fields: &[field("burn_rate", FieldKind::Uint(16))],
    },
    OperationSchema {
        name: "transfer",
        opcode: opcodes::TRANSFER,
        target: ProgramKind::Account,
        fields: &[
            field("amount", FieldKind::Amount),
            field("destination", FieldKind::Address),
            field("response_destination", FieldKind::Address),
            field("forward_amount", FieldKind::Amount),
            field("has_forward_payload", FieldKind::Bit),
            field("forward_payload", FieldKind::OptionalChild),
        ],
    },
    OperationSchema {
        name: "burn",
        opcode: opcodes::BURN,
        target: ProgramKind::Account,
        fields: &[field("amount", FieldKind::Amount)],
    },
    OperationSchema {
        name: "stake",
        opcode: opcodes::STAKE,
        target: ProgramKind::Account,
        fields: &[
            field("amount", FieldKind::Amount),
            field("duration", FieldKind::Uint(32)),
        ],
    },
    OperationSchema {
        name: "unstake",
        opcode: opcodes::UNSTAKE,
        target: ProgramKind::Account,
        fields: &[],
    },
    OperationSchema {
        name: "deposit",
        opcode: opcodes::DEPOSIT,
        target: ProgramKind::Account,
        fields: &[field("amount", FieldKind::Amount)],
    },
    OperationSchema {
        name: "withdraw",
        opcode: opcodes::WITHDRAW,
        target: ProgramKind::Account,
        fields: &[field("amount", FieldKind::Amount)],
    },
    OperationSchema {
        name: "claim",
        opcode: opcodes::CLAIM,
        target: ProgramKind::Account,
        fields: &[],
    },
    OperationSchema {
        name: "update_reward_rate",
        opcode: opcodes::UPDATE_REWARD_RATE,
        target: ProgramKind::StakingPool,
        fields: &[field("reward_rate", FieldKind::Uint(32))],
    },
];

/// Looks up the registry entry for `opcode`.
#[must_use]
pub fn schema_for(opcode: u32) -> Option<&'static OperationSchema> {
    REGISTRY.iter().find(|s| s.opcode == opcode)
}

// =============================================================================
// OPERATION
// =============================================================================

/// A typed request to one of the programs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Deployment message: empty body, state-init attached by the sender.
    /// Only meaningful for a program that is not deployed yet.
    Deploy,
    /// Mint `amount` to the account of `to`.
    Mint {
        /// Correlation id.
        query_id: u64,
        /// Holder receiving the tokens.
        to: Address,
        /// Tokens to mint.
        amount: Amount,
    },
    /// Suspend token operations.
    Pause {
        /// Correlation id.
        query_id: u64,
    },
    /// Resume token operations.
    Unpause {
        /// Correlation id.
        query_id: u64,
    },
    /// Blacklist `address`.
    AddToBlacklist {
        /// Correlation id.
        query_id: u64,
        /// Address to block.
        address: Address,
    },
    /// Remove `address` from the blacklist.
    RemoveFromBlacklist {
        /// Correlation id.
        query_id: u64,
        /// Address to unblock.
        address: Address,
    },
    /// Set staking APR (basis points).
    UpdateStakingApr {
        /// Correlation id.
        query_id: u64,
        /// New APR.
        apr: u16,
    },
    /// Set transfer burn rate (basis points).
    UpdateBurnRate {
        /// Correlation id.
        query_id: u64,
        /// New burn rate.
        burn_rate: u16,
    },
    /// Move tokens to another holder.
    Transfer {
        /// Correlation id.
        query_id: u64,
        /// Tokens to move.
        amount: Amount,
        /// Receiving holder.
        destination: Address,
        /// Where excess value is returned.
        response_destination: Address,
        /// Value forwarded with the transfer notification.
        forward_amount: Amount,
        /// Wire flag announcing a forward payload child.
        has_forward_payload: bool,
        /// Forward payload; must be present iff the flag is set.
        forward_payload: Option<Cell>,
    },
    /// Destroy tokens.
    Burn {
        /// Correlation id.
        query_id: u64,
        /// Tokens to burn.
        amount: Amount,
    },
    /// Lock tokens for `duration` seconds.
    Stake {
        /// Correlation id.
        query_id: u64,
        /// Tokens to lock.
        amount: Amount,
        /// Lock duration in seconds.
        duration: u32,
    },
    /// Release locked tokens.
    Unstake {
        /// Correlation id.
        query_id: u64,
    },
    /// Deposit into the farming pool.
    Deposit {
        /// Correlation id.
        query_id: u64,
        /// Tokens to deposit.
        amount: Amount,
    },
    /// Withdraw from the farming pool.
    Withdraw {
        /// Correlation id.
        query_id: u64,
        /// Tokens to withdraw.
        amount: Amount,
    },
    /// Claim farming rewards.
    Claim {
        /// Correlation id.
        query_id: u64,
    },
    /// Set the pool reward rate.
    UpdateRewardRate {
        /// Correlation id.
        query_id: u64,
        /// New reward rate.
        reward_rate: u32,
    },
}

impl Operation {
    /// Opcode, or `None` for the deploy message.
    #[must_use]
    pub fn opcode(&self) -> Option<u32> {
        let opcode = match self {
            Self::Deploy => return None,
            Self::Mint { .. } => opcodes::MINT,
            Self::Pause { .. } => opcodes::PAUSE,
            Self::Unpause { .. } => opcodes::UNPAUSE,
            Self::AddToBlacklist { .. } => opcodes::ADD_TO_BLACKLIST,
            Self::RemoveFromBlacklist { .. } => opcodes::REMOVE_FROM_BLACKLIST,
            Self::UpdateStakingApr { .. } => opcodes::UPDATE_STAKING_APR,
            Self::UpdateBurnRate { .. } => opcodes::UPDATE_BURN_RATE,
            Self::Transfer { .. } => opcodes::TRANSFER,
            Self::Burn { .. } => opcodes::BURN,
            Self::Stake { .. } => opcodes::STAKE,
            Self::Unstake { .. } => opcodes::UNSTAKE,
            Self::Deposit { .. } => opcodes::DEPOSIT,
            Self::Withdraw { .. } => opcodes::WITHDRAW,
            Self::Claim { .. } => opcodes::CLAIM,
            Self::UpdateRewardRate { .. } => opcodes::UPDATE_REWARD_RATE,
        };
        Some(opcode)
    }

    /// Registry entry, or `None` for the deploy message.
    #[must_use]
    pub fn schema(&self) -> Option<&'static OperationSchema> {
        self.opcode().and_then(schema_for)
    }

    /// Operation name as listed in the registry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.schema().map_or("deploy", |s| s.name)
    }

    /// Correlation id, or `None` for the deploy message.
    #[must_use]
    pub fn query_id(&self) -> Option<u64> {
        match self {
            Self::Deploy => None,
            Self::Mint { query_id, .. }
            | Self::Pause { query_id }
            | Self::Unpause { query_id }
            | Self::AddToBlacklist { query_id, .. }
            | Self::RemoveFromBlacklist { query_id, .. }
            | Self::UpdateStakingApr { query_id, .. }
            | Self::UpdateBurnRate { query_id, .. }
            | Self::Transfer { query_id, .. }
            | Self::Burn { query_id, .. }
            | Self::Stake { query_id, .. }
            | Self::Unstake { query_id }
            | Self::Deposit { query_id, .. }
            | Self::Withdraw { query_id, .. }
            | Self::Claim { query_id }
            | Self::UpdateRewardRate { query_id, .. } => Some(*query_id),
        }
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if a transfer's payload flag and payload disagree.
    pub fn validate(&self) -> Result<(), CodecError> {
        if let Self::Transfer {
            has_forward_payload,
            forward_payload,
            ..
        } = self
        {
            match (has_forward_payload, forward_payload.is_some()) {
                (true, false) => {
                    return Err(CodecError::InvalidOperation(
                        "forward payload flag set but no payload attached".into(),
                    ))
                }
                (false, true) => {
                    return Err(CodecError::InvalidOperation(
                        "forward payload attached but flag not set".into(),
                    ))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Encodes the message body.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` from [`Operation::validate`]; builder errors are
    /// impossible for these layouts but are propagated.
    pub fn encode(&self) -> Result<Cell, CodecError> {
        self.validate()?;

        let mut b = CellBuilder::new();
        if let (Some(opcode), Some(query_id)) = (self.opcode(), self.query_id()) {
            b.append_uint(u128::from(opcode), OPCODE_BITS)?
                .append_uint(u128::from(query_id), QUERY_ID_BITS)?;
        }

        match self {
            Self::Deploy
            | Self::Pause { .. }
            | Self::Unpause { .. }
            | Self::Unstake { .. }
            | Self::Claim { .. } => {}
            Self::Mint { to, amount, .. } => {
                b.append_address(to)?
                    .append_amount(*amount)?
                    .append_child(Cell::empty())?;
            }
            Self::AddToBlacklist { address, .. } | Self::RemoveFromBlacklist { address, .. } => {
                b.append_address(address)?;
            }
            Self::UpdateStakingApr { apr: value, .. }
            | Self::UpdateBurnRate {
                burn_rate: value, ..
            } => {
                b.append_uint(u128::from(*value), 16)?;
            }
            Self::Transfer {
                amount,
                destination,
                response_destination,
                forward_amount,
                has_forward_payload,
                forward_payload,
                ..
            } => {
                b.append_amount(*amount)?
                    .append_address(destination)?
                    .append_address(response_destination)?
                    .append_amount(*forward_amount)?
                    .append_bit(*has_forward_payload)?;
                if let Some(payload) = forward_payload {
                    b.append_child(payload.clone())?;
                }
            }
            Self::Burn { amount, .. }
            | Self::Deposit { amount, .. }
            | Self::Withdraw { amount, .. } => {
                b.append_amount(*amount)?;
            }
            Self::Stake {
                amount, duration, ..
            } => {
                b.append_amount(*amount)?
                    .append_uint(u128::from(*duration), 32)?;
            }
            Self::UpdateRewardRate { reward_rate, .. } => {
                b.append_uint(u128::from(*reward_rate), 32)?;
            }
        }
        Ok(b.finalize())
    }

    /// Decodes a message body. The empty cell decodes to [`Operation::Deploy`].
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for unknown opcodes or malformed fields, `Underflow`
    /// for truncated bodies, `TrailingData` if anything is left over.
    pub fn decode(body: &Cell) -> Result<Self, CodecError> {
        if body.is_empty() {
            return Ok(Self::Deploy);
        }

        let mut r = body.reader();
        let opcode = r.read_uint(OPCODE_BITS)? as u32;
        let query_id = r.read_uint(QUERY_ID_BITS)? as u64;

        let op = match opcode {
            opcodes::MINT => {
                let to = r.read_address()?;
                let amount = r.read_amount()?;
                if !r.read_child()?.is_empty() {
                    return Err(CodecError::SchemaMismatch(
                        "mint issuer message must be empty".into(),
                    ));
                }
                Self::Mint {
                    query_id,
                    to,
                    amount,
                }
            }
            opcodes::PAUSE => Self::Pause { query_id },
            opcodes::UNPAUSE => Self::Unpause { query_id },
            opcodes::ADD_TO_BLACKLIST => Self::AddToBlacklist {
                query_id,
                address: r.read_address()?,
            },
            opcodes::REMOVE_FROM_BLACKLIST => Self::RemoveFromBlacklist {
                query_id,
                address: r.read_address()?,
            },
            opcodes::UPDATE_STAKING_APR => Self::UpdateStakingApr {
                query_id,
                apr: r.read_uint(16)? as u16,
            },
            opcodes::UPDATE_BURN_RATE => Self::UpdateBurnRate {
                query_id,
                burn_rate: r.read_uint(16)? as u16,
            },
            opcodes::TRANSFER => decode_transfer(&mut r, query_id)?,
            opcodes::BURN => Self::Burn {
                query_id,
                amount: r.read_amount()?,
            },
            opcodes::STAKE => Self::Stake {
                query_id,
                amount: r.read_amount()?,
                duration: r.read_uint(32)? as u32,
            },
            opcodes::UNSTAKE => Self::Unstake { query_id },
            opcodes::DEPOSIT => Self::Deposit {
                query_id,
                amount: r.read_amount()?,
            },
            opcodes::WITHDRAW => Self::Withdraw {
                query_id,
                amount: r.read_amount()?,
            },
            opcodes::CLAIM => Self::Claim { query_id },
            opcodes::UPDATE_REWARD_RATE => Self::UpdateRewardRate {
                query_id,
                reward_rate: r.read_uint(32)? as u32,
            },
            other => {
                return Err(CodecError::SchemaMismatch(format!(
                    "unknown opcode 0x{other:08x}"
                )))
            }
        };
        r.ensure_consumed()?;
        Ok(op)
    }
}

fn decode_transfer(r: &mut CellReader, query_id: u64) -> Result<Operation, CodecError> {
    let amount = r.read_amount()?;
    let destination = r.read_address()?;
    let response_destination = r.read_address()?;
    let forward_amount = r.read_amount()?;
    let has_forward_payload = r.read_bit()?;
    let forward_payload = if has_forward_payload {
        Some(r.read_child()?)
    } else {
        None
    };
    Ok(Operation::Transfer {
        query_id,
        amount,
        destination,
        response_destination,
        forward_amount,
        has_forward_payload,
        forward_payload,
    })
}

// =============================================================================
// TESTS
// =============================================================================
