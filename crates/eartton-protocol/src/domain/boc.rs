//! # Bag of Cells
//!
//! Byte serialization of a cell tree, the form in which bodies, state-inits
//! and compiled program code cross the transport boundary.
//!
//! ```text
//! magic        b5ee9c72
//! flags        has_idx:1 has_crc32c:1 has_cache_bits:1 reserved:2 size:3
//! off_bytes    1 byte
//! cells        size bytes
//! roots        size bytes (always 1 here)
//! absent       size bytes (always 0)
//! tot_size     off_bytes bytes
//! root_index   size bytes
//! [index]      cells * off_bytes (skipped on read, never written)
//! cell*        d1 d2 data child_index*
//! [crc32c]     4 bytes little-endian
//! ```
//!
//! Cells are written parents-first and deduplicated by representation hash,
//! so a shared child is stored once.

use crate::domain::cell::{Cell, MAX_CHILDREN};
use crate::domain::value_objects::Hash;
use crate::errors::BocError;
use std::collections::{HashMap, HashSet};

/// Magic prefix of a serialized bag of cells.
pub const BOC_MAGIC: u32 = 0xb5ee_9c72;

const FLAG_HAS_INDEX: u8 = 0x80;
const FLAG_HAS_CRC: u8 = 0x40;
const FLAG_HAS_CACHE_BITS: u8 = 0x20;
const SIZE_MASK: u8 = 0x07;

// =============================================================================
// SERIALIZE
// =============================================================================

/// Serializes the tree under `root` with a CRC32C trailer.
#[must_use]
pub fn serialize(root: &Cell) -> Vec<u8> {
    let order = topological_order(root);
    let index: HashMap<Hash, usize> = order
        .iter()
        .enumerate()
        .map(|(i, c)| (c.hash(), i))
        .collect();
    let size = byte_width(order.len() as u64);

    let mut cells = Vec::new();
    for cell in &order {
        cells.extend_from_slice(&cell.descriptors());
        cells.extend(cell.padded_data());
        for child in cell.children() {
            let i = index.get(&child.hash()).copied().unwrap_or_default();
            write_be(&mut cells, i as u64, size);
        }
    }
    let off_bytes = byte_width(cells.len() as u64);

    let mut out = Vec::with_capacity(cells.len() + 32);
    out.extend_from_slice(&BOC_MAGIC.to_be_bytes());
    // Both widths are at most 8.
    out.push(FLAG_HAS_CRC | size as u8);
    out.push(off_bytes as u8);
    write_be(&mut out, order.len() as u64, size);
    write_be(&mut out, 1, size);
    write_be(&mut out, 0, size);
    write_be(&mut out, cells.len() as u64, off_bytes);
    write_be(&mut out, 0, size);
    out.extend(cells);

    let crc = crc32c::crc32c(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// Unique cells, each before all of its descendants, root first.
fn topological_order(root: &Cell) -> Vec<Cell> {
    fn visit(cell: &Cell, seen: &mut HashSet<Hash>, out: &mut Vec<Cell>) {
        if !seen.insert(cell.hash()) {
            return;
        }
        for child in cell.children() {
            visit(child, seen, out);
        }
        out.push(cell.clone());
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    visit(root, &mut seen, &mut out);
    out.reverse();
    out
}

fn byte_width(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

fn write_be(out: &mut Vec<u8>, value: u64, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

// =============================================================================
// DESERIALIZE
// =============================================================================

struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    children: Vec<usize>,
}

struct Input<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], BocError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(BocError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, BocError> {
        Ok(self.take(1)?[0])
    }

    fn uint(&mut self, width: usize) -> Result<usize, BocError> {
        Ok(self
            .take(width)?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b)))
    }
}

/// Parses a single-root bag of cells.
///
/// # Errors
///
/// `BadMagic`, `UnexpectedEof`, `ChecksumMismatch` when the CRC flag is set
/// and the trailer disagrees, `Unsupported` for multi-root or exotic-cell
/// input, `Malformed` for inconsistent headers or forward child indices.
pub fn deserialize(bytes: &[u8]) -> Result<Cell, BocError> {
    let mut input = Input { bytes, pos: 0 };

    let magic = u32::from_be_bytes(
        input
            .take(4)?
            .try_into()
            .map_err(|_| BocError::UnexpectedEof(0))?,
    );
    if magic != BOC_MAGIC {
        return Err(BocError::BadMagic(magic));
    }

    let flags = input.byte()?;
    if flags & FLAG_HAS_CACHE_BITS != 0 {
        return Err(BocError::Unsupported("cache bits".into()));
    }
    let size = usize::from(flags & SIZE_MASK);
    if size == 0 || size > 4 {
        return Err(BocError::Malformed(format!("reference size {size}")));
    }
    let off_bytes = usize::from(input.byte()?);
    if off_bytes == 0 || off_bytes > 8 {
        return Err(BocError::Malformed(format!("offset size {off_bytes}")));
    }

    let cell_count = input.uint(size)?;
    let roots = input.uint(size)?;
    let absent = input.uint(size)?;
    let total_size = input.uint(off_bytes)?;
    if roots != 1 {
        return Err(BocError::Unsupported(format!("{roots} roots")));
    }
    if absent != 0 {
        return Err(BocError::Unsupported("absent cells".into()));
    }
    let root_index = input.uint(size)?;
    if root_index >= cell_count {
        return Err(BocError::Malformed(format!("root index {root_index}")));
    }

    if flags & FLAG_HAS_INDEX != 0 {
        input.take(cell_count.saturating_mul(off_bytes))?;
    }

    let cells_start = input.pos;
    let mut raw = Vec::with_capacity(cell_count.min(bytes.len()));
    for i in 0..cell_count {
        raw.push(read_raw_cell(&mut input, i, cell_count, size)?);
    }
    if input.pos - cells_start != total_size {
        return Err(BocError::Malformed(format!(
            "cell section is {} bytes, header says {total_size}",
            input.pos - cells_start
        )));
    }

    if flags & FLAG_HAS_CRC != 0 {
        let computed = crc32c::crc32c(&bytes[..input.pos]);
        let stored = u32::from_le_bytes(
            input
                .take(4)?
                .try_into()
                .map_err(|_| BocError::UnexpectedEof(input.pos))?,
        );
        if stored != computed {
            return Err(BocError::ChecksumMismatch { stored, computed });
        }
    }
    if input.pos != bytes.len() {
        return Err(BocError::Malformed(format!(
            "{} trailing bytes",
            bytes.len() - input.pos
        )));
    }

    // Children always have higher indices, so build from the back.
    let mut built: Vec<Option<Cell>> = vec![None; cell_count];
    for (i, cell) in raw.into_iter().enumerate().rev() {
        let children = cell
            .children
            .iter()
            .map(|&c| {
                built[c]
                    .clone()
                    .ok_or_else(|| BocError::Malformed(format!("cell {c} unresolved")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        built[i] = Some(Cell::from_parts(cell.data, cell.bit_len, children)?);
    }
    built[root_index]
        .take()
        .ok_or_else(|| BocError::Malformed("root unresolved".into()))
}

fn read_raw_cell(
    input: &mut Input<'_>,
    index: usize,
    cell_count: usize,
    size: usize,
) -> Result<RawCell, BocError> {
    let d1 = input.byte()?;
    let d2 = input.byte()?;
    if d1 & 0x08 != 0 {
        return Err(BocError::Unsupported(format!("exotic cell {index}")));
    }
    if d1 >> 5 != 0 {
        return Err(BocError::Unsupported(format!("level mask on cell {index}")));
    }
    let child_count = usize::from(d1 & 0x07);
    if child_count > MAX_CHILDREN {
        return Err(BocError::Malformed(format!(
            "cell {index} has {child_count} children"
        )));
    }

    let data = input.take(usize::from(d2).div_ceil(2))?.to_vec();
    let bit_len = if d2 % 2 == 0 {
        usize::from(d2 / 2) * 8
    } else {
        let last = data.last().copied().unwrap_or(0);
        if last == 0 {
            return Err(BocError::Malformed(format!(
                "cell {index} is missing its completion tag"
            )));
        }
        usize::from(d2 / 2) * 8 + 7 - last.trailing_zeros() as usize
    };

    let mut children = Vec::with_capacity(child_count);
    for _ in 0..child_count {
        let child = input.uint(size)?;
        if child <= index || child >= cell_count {
            return Err(BocError::Malformed(format!(
                "cell {index} references cell {child}"
            )));
        }
        children.push(child);
    }
    Ok(RawCell {
        data,
        bit_len,
        children,
    })
}

// =============================================================================
// TESTS
// =============================================================================
