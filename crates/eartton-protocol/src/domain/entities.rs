//! # Domain Entities
//!
//! Composite types exchanged with the external transport: the state-init
//! pair used for deployment and the outbound message envelope.

use crate::domain::cell::Cell;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::CodecError;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// PROGRAM KIND
// =============================================================================

/// The three on-ledger program kinds this protocol targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramKind {
    /// Token issuance authority (master).
    Issuer,
    /// Per-holder balance program (wallet).
    Account,
    /// Staking / farming accounting program.
    StakingPool,
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issuer => "issuer",
            Self::Account => "account",
            Self::StakingPool => "staking-pool",
        };
        f.write_str(name)
    }
}

// =============================================================================
// STATE INIT
// =============================================================================

/// `split_depth`, `special`, `code`, `data`, `library` presence bits.
const STATE_INIT_FLAGS: u8 = 0b00110;

/// Program code plus initial data; its cell hash is the program address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateInit {
    /// Compiled program code.
    pub code: Cell,
    /// Initial persistent data.
    pub data: Cell,
}

impl StateInit {
    /// Creates a state-init pair.
    #[must_use]
    pub fn new(code: Cell, data: Cell) -> Self {
        Self { code, data }
    }

    /// Builds the state-init cell: `split_depth` absent, `special` absent,
    /// code present, data present, library absent (`0 0 1 1 0`), with
    /// children `[code, data]`.
    #[must_use]
    pub fn to_cell(&self) -> Cell {
        // 5 bits, 2 children: always within cell limits.
        Cell::assemble(
            STATE_INIT_FLAGS.view_bits::<Msb0>()[3..].to_bitvec(),
            vec![self.code.clone(), self.data.clone()],
        )
    }

    /// Parses a state-init cell produced by [`StateInit::to_cell`].
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for any other flag combination, `TrailingData` if
    /// more follows.
    pub fn from_cell(cell: &Cell) -> Result<Self, CodecError> {
        let mut r = cell.reader();
        let flags = r.read_uint(5)?;
        if flags != u128::from(STATE_INIT_FLAGS) {
            return Err(CodecError::SchemaMismatch(format!(
                "unsupported state-init flags 0b{flags:05b}"
            )));
        }
        let code = r.read_child()?;
        let data = r.read_child()?;
        r.ensure_consumed()?;
        Ok(Self { code, data })
    }
}

// =============================================================================
// SEND MODE
// =============================================================================

/// Message send mode understood by the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SendMode {
    /// Fees are deducted from the attached value.
    Ordinary,
    /// Fees are paid separately from the attached value.
    #[default]
    PayGasSeparately,
}

impl SendMode {
    /// Numeric mode flag.
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Ordinary => 0,
            Self::PayGasSeparately => 1,
        }
    }
}

// =============================================================================
// OUTBOUND MESSAGE
// =============================================================================

/// What a proxy hands to the send boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Target program address.
    pub destination: Address,
    /// Value attached to the message.
    pub value: Amount,
    /// Encoded operation.
    pub body: Cell,
    /// Present on deployment messages only.
    pub state_init: Option<StateInit>,
    /// How fees are charged.
    pub send_mode: SendMode,
}

// =============================================================================
// TESTS
// =============================================================================
