//! # Cell Reader
//!
//! Strictly sequential consumer of a finalized [`Cell`]: bits are read from
//! the front, children in order, with no backtracking.
//!
//! Decoders of fixed-shape records finish with [`CellReader::ensure_consumed`]
//! so that foreign or newer data is reported as `TrailingData` instead of
//! being silently dropped.

use crate::domain::cell::Cell;
use crate::domain::value_objects::{Address, Amount, Hash};
use crate::errors::CodecError;
use bitvec::prelude::*;

/// Sequential reader over one cell.
#[derive(Debug, Clone)]
pub struct CellReader {
    cell: Cell,
    bit_pos: usize,
    child_pos: usize,
}

impl CellReader {
    /// Starts reading `cell` from its first bit and first child.
    #[must_use]
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            bit_pos: 0,
            child_pos: 0,
        }
    }

    /// Unread bits.
    #[must_use]
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    /// Unread children.
    #[must_use]
    pub fn remaining_children(&self) -> usize {
        self.cell.children().len() - self.child_pos
    }

    fn ensure_bits(&self, bits: usize) -> Result<(), CodecError> {
        if bits > self.remaining_bits() {
            return Err(CodecError::Underflow {
                requested: bits,
                remaining: self.remaining_bits(),
            });
        }
        Ok(())
    }

    /// Next `bits` bits as a slice. Length must already be checked.
    fn take_slice(&mut self, bits: usize) -> &BitSlice<u8, Msb0> {
        let start = self.bit_pos;
        self.bit_pos += bits;
        &self.cell.bits()[start..start + bits]
    }

    /// Next `bits` (at most 128) bits as a big-endian integer.
    fn take_bits(&mut self, bits: usize) -> u128 {
        if bits == 0 {
            return 0;
        }
        self.take_slice(bits).load_be::<u128>()
    }

    /// Reads one bit.
    ///
    /// # Errors
    ///
    /// `Underflow` if no bits remain.
    pub fn read_bit(&mut self) -> Result<bool, CodecError> {
        self.ensure_bits(1)?;
        Ok(self.take_bits(1) == 1)
    }

    /// Reads an unsigned integer of `bits` bits (at most 128).
    ///
    /// # Errors
    ///
    /// `Underflow` if fewer bits remain, `ValueOutOfRange` for widths above 128.
    pub fn read_uint(&mut self, bits: usize) -> Result<u128, CodecError> {
        if bits > 128 {
            return Err(CodecError::ValueOutOfRange { bits });
        }
        self.ensure_bits(bits)?;
        Ok(self.take_bits(bits))
    }

    /// Reads a two's complement integer of `bits` bits (`1..=128`).
    ///
    /// # Errors
    ///
    /// `Underflow` if fewer bits remain, `ValueOutOfRange` for unsupported widths.
    pub fn read_int(&mut self, bits: usize) -> Result<i128, CodecError> {
        if bits == 0 || bits > 128 {
            return Err(CodecError::ValueOutOfRange { bits });
        }
        self.ensure_bits(bits)?;
        let raw = self.take_bits(bits);
        // Sign-extend from `bits` to 128.
        let shift = 128 - bits;
        Ok(((raw << shift) as i128) >> shift)
    }

    /// Reads `len` whole bytes.
    ///
    /// # Errors
    ///
    /// `Underflow` if fewer than `len * 8` bits remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        self.ensure_bits(len * 8)?;
        Ok(self
            .take_slice(len * 8)
            .chunks(8)
            .map(|byte| byte.load_be::<u8>())
            .collect())
    }

    /// Reads a variable-length amount.
    ///
    /// # Errors
    ///
    /// `Underflow` if the length prefix or payload is cut short.
    pub fn read_amount(&mut self) -> Result<Amount, CodecError> {
        let len = self.read_uint(4)? as usize;
        let value = self.read_uint(len * 8)?;
        Amount::new(value)
    }

    /// Reads a standard address.
    ///
    /// # Errors
    ///
    /// `Underflow` if the address is cut short, `SchemaMismatch` for any tag
    /// other than a standard address without anycast.
    pub fn read_address(&mut self) -> Result<Address, CodecError> {
        match self.read_uint(2)? {
            0b10 => {}
            0b00 => return Err(CodecError::SchemaMismatch("address is addr_none".into())),
            tag => {
                return Err(CodecError::SchemaMismatch(format!(
                    "unsupported address tag 0b{tag:02b}"
                )))
            }
        }
        if self.read_bit()? {
            return Err(CodecError::SchemaMismatch(
                "anycast addresses are not supported".into(),
            ));
        }
        // 8-bit read always fits i8.
        let workchain = self.read_int(8)? as i8;
        let bytes = self.read_bytes(32)?;
        let hash = Hash::from_slice(&bytes)
            .ok_or_else(|| CodecError::InvalidAddress("account id is not 32 bytes".into()))?;
        Ok(Address::new(workchain, hash))
    }

    /// Reads the next child reference.
    ///
    /// # Errors
    ///
    /// `Underflow` if no children remain.
    pub fn read_child(&mut self) -> Result<Cell, CodecError> {
        let child = self
            .cell
            .child(self.child_pos)
            .cloned()
            .ok_or(CodecError::Underflow {
                requested: 1,
                remaining: 0,
            })?;
        self.child_pos += 1;
        Ok(child)
    }

    /// Reads a snake-format string: the remaining whole bytes of this cell,
    /// then of each first child in turn.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for a dangling bit count or invalid UTF-8.
    pub fn read_string_tail(&mut self) -> Result<String, CodecError> {
        let mut bytes = Vec::new();
        let mut current = self.clone();
        loop {
            if current.remaining_bits() % 8 != 0 {
                return Err(CodecError::SchemaMismatch(
                    "string tail is not byte aligned".into(),
                ));
            }
            bytes.extend(current.read_bytes(current.remaining_bits() / 8)?);
            if current.remaining_children() == 0 {
                break;
            }
            current = current.read_child()?.reader();
        }
        self.bit_pos = self.cell.bit_len();
        self.child_pos = self.cell.children().len().min(self.child_pos + 1);
        String::from_utf8(bytes).map_err(|e| CodecError::SchemaMismatch(e.to_string()))
    }

    /// Fails unless every bit and child has been read.
    ///
    /// # Errors
    ///
    /// `TrailingData` with the unread counts.
    pub fn ensure_consumed(&self) -> Result<(), CodecError> {
        if self.remaining_bits() != 0 || self.remaining_children() != 0 {
            return Err(CodecError::TrailingData {
                bits: self.remaining_bits(),
                children: self.remaining_children(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
