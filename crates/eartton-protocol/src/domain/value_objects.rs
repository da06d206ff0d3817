//! # Value Objects
//!
//! Immutable domain primitives shared by the codec, the deriver and the
//! contract proxies. These types are defined by their value, not identity.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a hash from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// ADDRESS (workchain + 256-bit account id)
// =============================================================================

/// A contract address: workchain (partition) plus 256-bit account hash.
///
/// Two addresses are equal iff both fields are equal. Application code gets
/// addresses from [`derive_address`](crate::domain::services::derive_address),
/// from decoded cells, or from the raw text form `"<workchain>:<hex>"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    /// Logical shard the account lives in.
    pub workchain: i8,
    /// Account id.
    pub hash: Hash,
}

impl Address {
    /// Bits taken by an encoded standard address (tag, anycast, workchain, hash).
    pub const BIT_LEN: usize = 2 + 1 + 8 + 256;

    /// Creates an address from its parts.
    #[must_use]
    pub const fn new(workchain: i8, hash: Hash) -> Self {
        Self { workchain, hash }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, self.hash)
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hash) = s
            .split_once(':')
            .ok_or_else(|| CodecError::InvalidAddress(format!("missing ':' in `{s}`")))?;
        let workchain = workchain
            .parse::<i8>()
            .map_err(|e| CodecError::InvalidAddress(format!("workchain `{workchain}`: {e}")))?;
        let bytes = hex::decode(hash)
            .map_err(|e| CodecError::InvalidAddress(format!("account id `{hash}`: {e}")))?;
        let hash = Hash::from_slice(&bytes).ok_or_else(|| {
            CodecError::InvalidAddress(format!("account id is {} bytes, expected 32", bytes.len()))
        })?;
        Ok(Self::new(workchain, hash))
    }
}

impl TryFrom<String> for Address {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

// =============================================================================
// AMOUNT (variable-length coins)
// =============================================================================

/// Number of fractional decimal digits in one whole token.
pub const TOKEN_DECIMALS: u32 = 9;

const NANO_PER_TOKEN: u128 = 1_000_000_000;

/// A non-negative token or value quantity in nano units, below `2^120`.
///
/// Encoded on the wire as a 4-bit byte count followed by that many
/// big-endian bytes; zero is a bare `0000` length.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(try_from = "u128", into = "u128")]
pub struct Amount(u128);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Largest encodable amount, `2^120 - 1`.
    pub const MAX: Self = Self((1u128 << 120) - 1);

    /// Creates an amount, rejecting values of `2^120` and above.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `nano >= 2^120`.
    pub fn new(nano: u128) -> Result<Self, CodecError> {
        if nano > Self::MAX.0 {
            return Err(CodecError::ValueOutOfRange { bits: 120 });
        }
        Ok(Self(nano))
    }

    /// Creates an amount from a nano-unit count that always fits.
    #[must_use]
    pub const fn from_nano(nano: u64) -> Self {
        Self(nano as u128)
    }

    /// Creates an amount of `tokens` whole tokens.
    #[must_use]
    pub const fn from_whole_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * NANO_PER_TOKEN)
    }

    /// Parses a decimal token quantity such as `"0.05"` or `"1000000"`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for malformed text or more than nine
    /// fractional digits, `ValueOutOfRange` if the result is too large.
    pub fn from_tokens(text: &str) -> Result<Self, CodecError> {
        let malformed = || CodecError::InvalidOperation(format!("invalid token amount `{text}`"));
        let (whole, frac) = text.trim().split_once('.').unwrap_or((text.trim(), ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if frac.len() > TOKEN_DECIMALS as usize
            || !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| CodecError::ValueOutOfRange { bits: 120 })?
        };
        let mut frac_nano: u128 = if frac.is_empty() { 0 } else { frac.parse().map_err(|_| malformed())? };
        for _ in frac.len()..TOKEN_DECIMALS as usize {
            frac_nano *= 10;
        }

        let nano = whole
            .checked_mul(NANO_PER_TOKEN)
            .and_then(|n| n.checked_add(frac_nano))
            .ok_or(CodecError::ValueOutOfRange { bits: 120 })?;
        Self::new(nano)
    }

    /// Returns the amount in nano units.
    #[must_use]
    pub const fn nano(self) -> u128 {
        self.0
    }

    /// Number of payload bytes in the wire encoding (0..=15).
    #[must_use]
    pub const fn byte_len(self) -> usize {
        ((128 - self.0.leading_zeros() as usize) + 7) / 8
    }

    /// Total bits taken by the wire encoding.
    #[must_use]
    pub const fn encoded_bit_len(self) -> usize {
        4 + 8 * self.byte_len()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANO_PER_TOKEN;
        let frac = self.0 % NANO_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let frac = format!("{frac:09}");
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl TryFrom<u128> for Amount {
    type Error = CodecError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
