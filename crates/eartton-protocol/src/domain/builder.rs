//! # Cell Builder
//!
//! Incrementally assembles a [`Cell`] from typed fields.
//!
//! Every append checks the cell limits before touching the buffer, so a
//! failed append leaves the builder exactly as it was. `finalize` consumes
//! the builder: a builder cannot be reused once its cell exists.

use crate::domain::cell::{Cell, CellBits, MAX_BITS, MAX_CHILDREN};
use crate::domain::value_objects::{Address, Amount};
use crate::errors::CodecError;
use bitvec::prelude::*;

/// Single-owner, single-use cell builder.
#[derive(Debug, Default)]
pub struct CellBuilder {
    bits: CellBits,
    children: Vec<Cell>,
}

impl CellBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bits: CellBits::with_capacity(MAX_BITS),
            children: Vec::new(),
        }
    }

    /// Bits stored so far.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Bits still available.
    #[must_use]
    pub fn remaining_bits(&self) -> usize {
        MAX_BITS - self.bits.len()
    }

    /// Child slots still available.
    #[must_use]
    pub fn remaining_children(&self) -> usize {
        MAX_CHILDREN - self.children.len()
    }

    fn ensure_capacity(&self, bits: usize) -> Result<(), CodecError> {
        if bits > self.remaining_bits() {
            return Err(CodecError::CapacityExceeded {
                used: self.bits.len(),
                requested: bits,
            });
        }
        Ok(())
    }

    /// Pushes the low `bits` bits of `value`, MSB first, left-padded with
    /// zeros when `bits > 128`. Capacity must already be checked.
    fn push_bits(&mut self, value: u128, bits: usize) {
        let pad = bits.saturating_sub(128);
        self.bits.resize(self.bits.len() + pad, false);
        let width = bits - pad;
        if width == 0 {
            return;
        }
        let start = self.bits.len();
        self.bits.resize(start + width, false);
        self.bits[start..].store_be(value);
    }

    /// Appends a single bit.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the cell is full.
    pub fn append_bit(&mut self, bit: bool) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(1)?;
        self.bits.push(bit);
        Ok(self)
    }

    /// Appends `value` as an unsigned integer of `bits` bits.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the field does not fit in the cell,
    /// `ValueOutOfRange` if `value` needs more than `bits` bits.
    pub fn append_uint(&mut self, value: u128, bits: usize) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(bits)?;
        if bits < 128 && value >> bits != 0 {
            return Err(CodecError::ValueOutOfRange { bits });
        }
        self.push_bits(value, bits);
        Ok(self)
    }

    /// Appends `value` as a two's complement integer of `bits` bits
    /// (`1..=128`).
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the field does not fit in the cell,
    /// `ValueOutOfRange` if `value` is outside the signed range of `bits`.
    pub fn append_int(&mut self, value: i128, bits: usize) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(bits)?;
        if bits == 0 || bits > 128 {
            return Err(CodecError::ValueOutOfRange { bits });
        }
        if bits < 128 {
            let min = -(1i128 << (bits - 1));
            let max = (1i128 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(CodecError::ValueOutOfRange { bits });
            }
        }
        // Reinterpret as unsigned; push_bits keeps only the low `bits` bits.
        self.push_bits(value as u128, bits);
        Ok(self)
    }

    /// Appends raw bytes (8 bits each).
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the bytes do not fit in the cell.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(bytes.len() * 8)?;
        self.bits.extend_from_bitslice(bytes.view_bits::<Msb0>());
        Ok(self)
    }

    /// Appends a variable-length amount: 4-bit byte count, then the bytes.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the encoding does not fit in the cell.
    pub fn append_amount(&mut self, amount: Amount) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(amount.encoded_bit_len())?;
        let len = amount.byte_len();
        self.push_bits(len as u128, 4);
        self.push_bits(amount.nano(), len * 8);
        Ok(self)
    }

    /// Appends a standard address: tag `10`, anycast `0`, 8-bit workchain,
    /// 256-bit account id.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the 267 address bits do not fit in the cell.
    pub fn append_address(&mut self, address: &Address) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(Address::BIT_LEN)?;
        self.append_uint(0b10, 2)?
            .append_bit(false)?
            .append_int(i128::from(address.workchain), 8)?
            .append_bytes(address.hash.as_bytes())
    }

    /// Appends a child reference.
    ///
    /// # Errors
    ///
    /// `TooManyChildren` if four children are already held.
    pub fn append_child(&mut self, child: Cell) -> Result<&mut Self, CodecError> {
        if self.children.len() >= MAX_CHILDREN {
            return Err(CodecError::TooManyChildren);
        }
        self.children.push(child);
        Ok(self)
    }

    /// Appends the bits and children of `cell` to this builder.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` or `TooManyChildren` if the contents do not fit.
    pub fn append_cell_contents(&mut self, cell: &Cell) -> Result<&mut Self, CodecError> {
        self.ensure_capacity(cell.bit_len())?;
        if cell.children().len() > self.remaining_children() {
            return Err(CodecError::TooManyChildren);
        }
        self.bits.extend_from_bitslice(cell.bits());
        self.children.extend(cell.children().iter().cloned());
        Ok(self)
    }

    /// Appends a UTF-8 string in snake format: as many whole bytes as fit
    /// here, the rest in a chain of children holding 127 bytes each.
    ///
    /// # Errors
    ///
    /// `TooManyChildren` if the string spills over and no child slot is free.
    pub fn append_string_tail(&mut self, text: &str) -> Result<&mut Self, CodecError> {
        let bytes = text.as_bytes();
        let here = (self.remaining_bits() / 8).min(bytes.len());
        let (head, rest) = bytes.split_at(here);
        if !rest.is_empty() && self.remaining_children() == 0 {
            return Err(CodecError::TooManyChildren);
        }

        let full = MAX_BITS / 8;
        let mut tail: Option<Cell> = None;
        for chunk in rest.chunks(full).rev() {
            let mut b = CellBuilder::new();
            b.append_bytes(chunk)?;
            if let Some(next) = tail.take() {
                b.append_child(next)?;
            }
            tail = Some(b.finalize());
        }

        self.append_bytes(head)?;
        if let Some(child) = tail {
            self.append_child(child)?;
        }
        Ok(self)
    }

    /// Finishes the cell.
    #[must_use]
    pub fn finalize(self) -> Cell {
        Cell::assemble(self.bits, self.children)
    }
}

// =============================================================================
// TESTS
// =============================================================================
