//! # Error Types
//!
//! All error types for the Eartton protocol client.
//!
//! | Error | Raised by | Nature |
//! |-------|-----------|--------|
//! | `CodecError` | builder, reader, operation registry, stack decoding | local, never retried |
//! | `BocError` | bag-of-cells codec | malformed input bytes |
//! | `TransportError` | port implementations (send / get-method) | external |
//! | `ContractError` | contract proxies, query client | wraps the above |

use crate::config::ConfigError;
use thiserror::Error;

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors raised while building, reading, encoding or decoding cells.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Appending would push the cell past 1023 data bits.
    #[error("cell capacity exceeded: {used} bits used, {requested} more requested")]
    CapacityExceeded {
        /// Bits already stored.
        used: usize,
        /// Bits the failed append asked for.
        requested: usize,
    },

    /// The value does not fit in the requested bit width.
    #[error("value out of range for {bits}-bit field")]
    ValueOutOfRange {
        /// Width of the target field.
        bits: usize,
    },

    /// A fifth child reference was appended.
    #[error("too many children: a cell holds at most 4 references")]
    TooManyChildren,

    /// Fewer bits or children remain than a read requested.
    #[error("underflow: requested {requested}, remaining {remaining}")]
    Underflow {
        /// Bits (or children) requested.
        requested: usize,
        /// Bits (or children) left in the cell.
        remaining: usize,
    },

    /// A fixed-shape decoder finished with data left over.
    #[error("trailing data: {bits} bits and {children} children left unread")]
    TrailingData {
        /// Unread bits.
        bits: usize,
        /// Unread children.
        children: usize,
    },

    /// Decoded data does not have the expected shape.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Cross-field consistency violation detected before encoding.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Address text or encoding could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl CodecError {
    /// Returns true if this error was raised while decoding foreign data
    /// rather than while encoding caller input.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::Underflow { .. } | Self::TrailingData { .. } | Self::SchemaMismatch(_)
        )
    }
}

// =============================================================================
// BAG-OF-CELLS ERRORS
// =============================================================================

/// Errors from parsing serialized bag-of-cells bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BocError {
    /// Input ended before the structure was complete.
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    /// Magic prefix is not `b5ee9c72`.
    #[error("unknown magic: 0x{0:08x}")]
    BadMagic(u32),

    /// Stored checksum does not match.
    #[error("crc32c mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ChecksumMismatch {
        /// Checksum found in the input.
        stored: u32,
        /// Checksum computed over the input.
        computed: u32,
    },

    /// Header or cell descriptor carries an unsupported value.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Structure is internally inconsistent.
    #[error("malformed: {0}")]
    Malformed(String),

    /// A decoded cell violates cell limits.
    #[error("cell error: {0}")]
    Cell(#[from] CodecError),
}

// =============================================================================
// TRANSPORT ERRORS
// =============================================================================

/// Errors reported by the external send / get-method collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The ledger rejected the message (business rule, bounce, ...).
    #[error("rejected by ledger: {0}")]
    Rejected(String),

    /// The collaborator could not be reached.
    #[error("transport unavailable")]
    Unavailable,

    /// The collaborator did not answer in time.
    #[error("transport timeout after {timeout_ms}ms")]
    Timeout {
        /// Elapsed time budget.
        timeout_ms: u64,
    },

    /// Other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Errors surfaced by the contract proxies and the query client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The external collaborator failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A get-method ran but produced no successful result.
    #[error("get-method `{method}` failed with exit code {exit_code}")]
    GetMethodFailed {
        /// Method name.
        method: String,
        /// Non-zero exit code reported by the executor.
        exit_code: i32,
    },

    /// Deployment requested on an instance built from an address alone.
    #[error("contract at {0} has no deploy payload")]
    NotDeployable(String),

    /// Contract parameters are out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transfer had no explicit response destination and the sender has no address.
    #[error("transfer needs a response destination and the sender has no address")]
    MissingResponseDestination,
}

// =============================================================================
// TESTS
// =============================================================================
