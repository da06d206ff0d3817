//! # Cell
//!
//! The atomic serialization unit: up to 1023 data bits plus up to four
//! references to child cells.
//!
//! Cells are immutable once built and shared through `Arc`, so one child may
//! hang off any number of parents. Identity is the representation hash:
//!
//! ```text
//! repr = d1 || d2 || data_with_completion_tag || depth(child_i)* || hash(child_i)*
//! d1   = number of children
//! d2   = floor(bits / 8) + ceil(bits / 8)
//! hash = sha256(repr)
//! ```
//!
//! Two structurally identical cells therefore compare equal and hash equal
//! regardless of how they were built.

use crate::domain::reader::CellReader;
use crate::domain::value_objects::Hash;
use crate::errors::CodecError;
use bitvec::prelude::*;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Maximum number of data bits in one cell.
pub const MAX_BITS: usize = 1023;

/// Maximum number of child references in one cell.
pub const MAX_CHILDREN: usize = 4;

/// Cell payload: bits in wire order, packed MSB-first.
pub type CellBits = BitVec<u8, Msb0>;

/// An immutable, content-addressed tree node.
#[derive(Clone)]
pub struct Cell(Arc<CellInner>);

struct CellInner {
    /// Dead bits of the last byte are zero.
    bits: CellBits,
    children: Vec<Cell>,
    hash: Hash,
    depth: u16,
}

impl Cell {
    /// Creates a cell from packed bits and children, enforcing cell limits.
    ///
    /// `data` must hold at least `ceil(bit_len / 8)` bytes; bits past
    /// `bit_len` are ignored.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` for more than 1023 bits, `TooManyChildren` for more
    /// than four children, `Underflow` if `data` is shorter than `bit_len`.
    pub fn from_parts(
        data: Vec<u8>,
        bit_len: usize,
        children: Vec<Cell>,
    ) -> Result<Self, CodecError> {
        if bit_len > MAX_BITS {
            return Err(CodecError::CapacityExceeded {
                used: 0,
                requested: bit_len,
            });
        }
        if children.len() > MAX_CHILDREN {
            return Err(CodecError::TooManyChildren);
        }
        let byte_len = bit_len.div_ceil(8);
        if data.len() < byte_len {
            return Err(CodecError::Underflow {
                requested: bit_len,
                remaining: data.len() * 8,
            });
        }
        let mut bits = CellBits::from_slice(&data[..byte_len]);
        bits.truncate(bit_len);
        Ok(Self::assemble(bits, children))
    }

    /// Builds a cell from parts already known to respect the limits.
    pub(crate) fn assemble(mut bits: CellBits, children: Vec<Cell>) -> Self {
        bits.set_uninitialized(false);
        let depth = children
            .iter()
            .map(|c| c.depth().saturating_add(1))
            .max()
            .unwrap_or(0);
        let mut inner = CellInner {
            bits,
            children,
            hash: Hash::ZERO,
            depth,
        };
        inner.hash = representation_hash(&inner);
        Self(Arc::new(inner))
    }

    /// The cell with no bits and no children.
    #[must_use]
    pub fn empty() -> Self {
        Self::assemble(CellBits::new(), Vec::new())
    }

    /// Number of data bits.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.0.bits.len()
    }

    /// Payload bits.
    #[must_use]
    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0.bits
    }

    /// Packed data bytes, MSB-first, trailing bits zeroed.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.0.bits.as_raw_slice()
    }

    /// Child references, in order.
    #[must_use]
    pub fn children(&self) -> &[Cell] {
        &self.0.children
    }

    /// Child reference at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Cell> {
        self.0.children.get(index)
    }

    /// Representation hash.
    #[must_use]
    pub fn hash(&self) -> Hash {
        self.0.hash
    }

    /// Longest path to a leaf (0 for a leaf).
    #[must_use]
    pub fn depth(&self) -> u16 {
        self.0.depth
    }

    /// True if the cell has neither bits nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.bits.is_empty() && self.0.children.is_empty()
    }

    /// Bit at `index` (MSB-first), `None` past the end.
    #[must_use]
    pub fn bit(&self, index: usize) -> Option<bool> {
        self.0.bits.get(index).map(|bit| *bit)
    }

    /// Starts a sequential read over this cell.
    #[must_use]
    pub fn reader(&self) -> CellReader {
        CellReader::new(self.clone())
    }

    /// Descriptor bytes `d1`, `d2` of an ordinary cell.
    pub(crate) fn descriptors(&self) -> [u8; 2] {
        descriptors(&self.0)
    }

    /// Data bytes with the completion tag appended when not byte-aligned.
    pub(crate) fn padded_data(&self) -> Vec<u8> {
        padded_data(&self.0)
    }
}

fn descriptors(inner: &CellInner) -> [u8; 2] {
    // Both fit: children <= 4, bits <= 1023.
    let bit_len = inner.bits.len();
    let d1 = inner.children.len() as u8;
    let d2 = (bit_len / 8 + bit_len.div_ceil(8)) as u8;
    [d1, d2]
}

/// Payload bytes with a completion tag: a `1` bit after the last data bit,
/// zeros to the byte boundary.
fn padded_data(inner: &CellInner) -> Vec<u8> {
    let mut tagged = inner.bits.clone();
    if tagged.len() % 8 != 0 {
        tagged.push(true);
        tagged.set_uninitialized(false);
    }
    tagged.as_raw_slice().to_vec()
}

fn representation_hash(inner: &CellInner) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(descriptors(inner));
    hasher.update(padded_data(inner));
    for child in &inner.children {
        hasher.update(child.depth().to_be_bytes());
    }
    for child in &inner.children {
        hasher.update(child.hash().as_bytes());
    }
    Hash::new(hasher.finalize().into())
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.hash == other.0.hash
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.0.bits.len())
            .field("data", &hex::encode(self.data()))
            .field("children", &self.0.children)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
