//! # Get-Method Stack
//!
//! Values exchanged with the query boundary and the positional reader over
//! a get-method result.
//!
//! A [`QueryResult`] is consumed front to back with typed reads. Asking for
//! a value that is not there, or of the wrong kind, is `SchemaMismatch`;
//! so is leaving values unread when [`QueryResult::finish`] is called.

use crate::domain::builder::CellBuilder;
use crate::domain::cell::Cell;
use crate::domain::value_objects::{Address, Amount};
use crate::errors::CodecError;
use std::collections::VecDeque;
use std::fmt;

/// One entry of a get-method argument or result stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackValue {
    /// Integer (257-bit on the ledger; this client handles the `i128` range).
    Int(i128),
    /// Cell reference.
    Cell(Cell),
    /// Slice, carried as the cell it reads from.
    Slice(Cell),
    /// Null.
    Null,
}

impl StackValue {
    /// Wraps an address as a slice argument.
    ///
    /// # Errors
    ///
    /// Propagates builder errors (an address always fits an empty cell).
    pub fn address(address: &Address) -> Result<Self, CodecError> {
        let mut b = CellBuilder::new();
        b.append_address(address)?;
        Ok(Self::Slice(b.finalize()))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Cell(_) => "cell",
            Self::Slice(_) => "slice",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for StackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "int({v})"),
            Self::Cell(c) => write!(f, "cell({})", c.hash()),
            Self::Slice(c) => write!(f, "slice({})", c.hash()),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Ordered get-method result, read positionally.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct QueryResult {
    values: VecDeque<StackValue>,
    position: usize,
}

impl QueryResult {
    /// Wraps a result stack, first value first.
    #[must_use]
    pub fn new(values: Vec<StackValue>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// Values not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn next(&mut self, expected: &str) -> Result<StackValue, CodecError> {
        let value = self.values.pop_front().ok_or_else(|| {
            CodecError::SchemaMismatch(format!(
                "expected {expected} at position {}, result exhausted",
                self.position
            ))
        })?;
        self.position += 1;
        Ok(value)
    }

    fn mismatch(&self, expected: &str, found: &StackValue) -> CodecError {
        CodecError::SchemaMismatch(format!(
            "expected {expected} at position {}, found {}",
            self.position - 1,
            found.kind()
        ))
    }

    fn invalid(&self, expected: &str, cause: &CodecError) -> CodecError {
        CodecError::SchemaMismatch(format!(
            "invalid {expected} at position {}: {cause}",
            self.position - 1
        ))
    }

    /// Reads an integer of any width.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted or the value is not an integer.
    pub fn read_big_number(&mut self) -> Result<i128, CodecError> {
        match self.next("int")? {
            StackValue::Int(v) => Ok(v),
            other => Err(self.mismatch("int", &other)),
        }
    }

    /// Reads an integer that must fit `T`.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted, not an integer, or out of `T`'s range.
    pub fn read_number<T: TryFrom<i128>>(&mut self) -> Result<T, CodecError> {
        let v = self.read_big_number()?;
        T::try_from(v).map_err(|_| {
            CodecError::SchemaMismatch(format!(
                "integer {v} at position {} out of range",
                self.position - 1
            ))
        })
    }

    /// Reads a token amount.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted, not an integer, negative, or above
    /// the amount maximum.
    pub fn read_amount(&mut self) -> Result<Amount, CodecError> {
        let v: u128 = self.read_number()?;
        Amount::new(v).map_err(|e| self.invalid("amount", &e))
    }

    /// Reads a boolean; any non-zero integer is true.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted or the value is not an integer.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_big_number()? != 0)
    }

    /// Reads a cell or slice.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted or the value is not a cell or slice.
    pub fn read_cell(&mut self) -> Result<Cell, CodecError> {
        match self.next("cell")? {
            StackValue::Cell(c) | StackValue::Slice(c) => Ok(c),
            other => Err(self.mismatch("cell", &other)),
        }
    }

    /// Reads a standard address from a slice or cell.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if exhausted, of the wrong kind, or not holding
    /// exactly one address.
    pub fn read_address(&mut self) -> Result<Address, CodecError> {
        let cell = match self.next("address")? {
            StackValue::Cell(c) | StackValue::Slice(c) => c,
            other => return Err(self.mismatch("address", &other)),
        };
        let mut r = cell.reader();
        r.read_address()
            .and_then(|address| r.ensure_consumed().map(|()| address))
            .map_err(|e| self.invalid("address", &e))
    }

    /// Fails if any value is left unread.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` with the count of leftover values.
    pub fn finish(self) -> Result<(), CodecError> {
        if !self.values.is_empty() {
            return Err(CodecError::SchemaMismatch(format!(
                "{} unread result values",
                self.values.len()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
