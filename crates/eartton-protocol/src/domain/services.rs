//! # Domain Services
//!
//! Pure functions over cells. Deterministic, no I/O, no shared state.

use crate::domain::builder::CellBuilder;
use crate::domain::cell::Cell;
use crate::domain::entities::StateInit;
use crate::domain::value_objects::Address;
use crate::errors::CodecError;

// =============================================================================
// ADDRESS DERIVATION
// =============================================================================

/// Derives the address of the program with the given code and initial data.
///
/// Address = (`workchain`, `repr_hash(state_init(code, data))`)
///
/// Identical inputs always give the identical address; flipping any bit of
/// `code` or `data` changes the hash.
#[must_use]
pub fn derive_address(workchain: i8, code: &Cell, data: &Cell) -> Address {
    state_init_address(workchain, &StateInit::new(code.clone(), data.clone()))
}

/// Derives the address of a [`StateInit`].
#[must_use]
pub fn state_init_address(workchain: i8, init: &StateInit) -> Address {
    Address::new(workchain, init.to_cell().hash())
}

// =============================================================================
// TOKEN METADATA
// =============================================================================

/// Marker byte of off-chain token metadata.
pub const OFFCHAIN_CONTENT_PREFIX: u8 = 0x01;

/// Builds an off-chain metadata cell: marker `0x01`, then `url` as a snake
/// string.
///
/// # Errors
///
/// Propagates builder errors; a fresh cell always has room for the chain.
pub fn offchain_content(url: &str) -> Result<Cell, CodecError> {
    let mut b = CellBuilder::new();
    b.append_uint(u128::from(OFFCHAIN_CONTENT_PREFIX), 8)?
        .append_string_tail(url)?;
    Ok(b.finalize())
}

/// Reads the URL back out of an off-chain metadata cell.
///
/// # Errors
///
/// `SchemaMismatch` if the marker is not `0x01` or the URL is not UTF-8.
pub fn parse_offchain_content(cell: &Cell) -> Result<String, CodecError> {
    let mut r = cell.reader();
    let prefix = r.read_uint(8)?;
    if prefix != u128::from(OFFCHAIN_CONTENT_PREFIX) {
        return Err(CodecError::SchemaMismatch(format!(
            "content prefix 0x{prefix:02x} is not off-chain"
        )));
    }
    let url = r.read_string_tail()?;
    r.ensure_consumed()?;
    Ok(url)
}

// =============================================================================
// TESTS
// =============================================================================
