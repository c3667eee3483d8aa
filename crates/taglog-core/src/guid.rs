// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Checksummed tag identifiers.
//!
//! A [`Guid`] is 16 bytes: seven bytes of entropy, one checksum byte (the sum
//! of the entropy bytes mod 256) and eight zero bytes. Its text form reads the
//! block as four big-endian `u32` groups and writes each one as exactly six
//! base-41 digits, most significant first, over [`CHARSET`]:
//!
//! ```text
//! af0s8e-aS35D0-aaaaaa-aaaaaa
//! ```
//!
//! The mapping is fixed; identifiers already in circulation must keep
//! decoding to the same bytes.
//!
//! # Digit range
//!
//! `41^6` exceeds `u32::MAX`, so the leading digit of a group never goes past
//! index 37 (`'7'`). The last three symbols (`'8'`, `'9'`, `'0'`) only ever
//! appear in the lower five positions of a group.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Digit alphabet, indexed by digit value.
pub const CHARSET: &str = "abcdefghkopqrstyABCDEFGHKLPQRSTY234567890";
/// Numeric base of each digit.
pub const BASE: u32 = 41;
/// Bytes of entropy consumed per identifier.
pub const ENTROPY_LEN: usize = 7;
/// Size of the binary identifier.
pub const GUID_LEN: usize = 16;
/// Number of `u32` groups in the text form.
pub const GROUP_COUNT: usize = GUID_LEN / 4;
/// Digits per group.
pub const GROUP_WIDTH: usize = 6;
/// Group separator.
pub const SEPARATOR: char = '-';
/// Length of the text form.
pub const ENCODED_LEN: usize = GROUP_COUNT * GROUP_WIDTH + (GROUP_COUNT - 1);

const CHARSET_BYTES: &[u8] = CHARSET.as_bytes();

/// Errors from generating, parsing or verifying identifiers.
#[derive(Debug, Error)]
pub enum GuidError {
    /// The entropy source could not deliver the requested bytes.
    #[error("[GUID_ENTROPY] entropy source failed: {0}")]
    Entropy(#[source] io::Error),
    /// Text does not have the `XXXXXX-XXXXXX-XXXXXX-XXXXXX` shape.
    #[error("[GUID_MALFORMED] `{input}` is not of the form XXXXXX-XXXXXX-XXXXXX-XXXXXX")]
    Malformed {
        /// Rejected text.
        input: String,
    },
    /// A digit outside the alphabet.
    #[error("[GUID_SYMBOL] `{symbol}` is not a GUID digit")]
    InvalidSymbol {
        /// Rejected character.
        symbol: char,
    },
    /// A group's value does not fit in 32 bits.
    #[error("[GUID_OVERFLOW] group {group} exceeds 32 bits")]
    GroupOverflow {
        /// Zero-based group index.
        group: usize,
    },
    /// The checksum byte does not match the entropy bytes.
    #[error("[GUID_CHECKSUM] expected checksum {expected:#04x}, found {found:#04x}")]
    ChecksumMismatch {
        /// Checksum computed from the entropy bytes.
        expected: u8,
        /// Checksum byte carried by the identifier.
        found: u8,
    },
    /// The trailing padding bytes are not all zero.
    #[error("[GUID_PADDING] trailing padding bytes are not zero")]
    NonZeroPadding,
}

/// Source of the random bytes behind a new identifier.
pub trait EntropySource {
    /// Fill `buf` completely or fail.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), GuidError>;
}

/// Operating-system randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), GuidError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|err| GuidError::Entropy(io::Error::other(err)))
    }
}

/// Entropy read from any byte stream, e.g. a random device or a fixture file.
#[derive(Debug)]
pub struct ReaderEntropy<R> {
    reader: R,
}

impl<R: Read> ReaderEntropy<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ReaderEntropy<File> {
    /// Open a file (such as `/dev/random`) as an entropy source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GuidError> {
        File::open(path).map(Self::new).map_err(GuidError::Entropy)
    }
}

impl<R: Read> EntropySource for ReaderEntropy<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), GuidError> {
        self.reader.read_exact(buf).map_err(GuidError::Entropy)
    }
}

/// Sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// A 16-byte checksummed tag identifier.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Guid(pub [u8; GUID_LEN]);

impl Guid {
    /// Build an identifier from seven entropy bytes.
    pub fn from_entropy(entropy: [u8; ENTROPY_LEN]) -> Self {
        let mut bytes = [0u8; GUID_LEN];
        bytes[..ENTROPY_LEN].copy_from_slice(&entropy);
        bytes[ENTROPY_LEN] = checksum(&entropy);
        Self(bytes)
    }

    /// Read [`ENTROPY_LEN`] bytes from `source` once and build an identifier.
    pub fn generate<E>(source: &mut E) -> Result<Self, GuidError>
    where
        E: EntropySource + ?Sized,
    {
        let mut entropy = [0u8; ENTROPY_LEN];
        source.fill(&mut entropy)?;
        Ok(Self::from_entropy(entropy))
    }

    /// View the identifier as bytes.
    pub fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// The four big-endian groups rendered in the text form.
    pub fn groups(&self) -> [u32; GROUP_COUNT] {
        let mut groups = [0u32; GROUP_COUNT];
        for (slot, chunk) in groups.iter_mut().zip(self.0.chunks_exact(4)) {
            *slot = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        groups
    }

    /// Check the checksum byte and the zero padding.
    pub fn verify(&self) -> Result<(), GuidError> {
        let expected = checksum(&self.0[..ENTROPY_LEN]);
        let found = self.0[ENTROPY_LEN];
        if expected != found {
            return Err(GuidError::ChecksumMismatch { expected, found });
        }
        if self.0[ENTROPY_LEN + 1..].iter().any(|b| *b != 0) {
            return Err(GuidError::NonZeroPadding);
        }
        Ok(())
    }
}

fn encode_group(mut value: u32) -> [u8; GROUP_WIDTH] {
    let mut digits = [0u8; GROUP_WIDTH];
    for slot in digits.iter_mut().rev() {
        *slot = CHARSET_BYTES[(value % BASE) as usize];
        value /= BASE;
    }
    digits
}

fn digit_value(symbol: char) -> Option<u32> {
    let byte = u8::try_from(symbol).ok()?;
    let index = CHARSET_BYTES.iter().position(|c| *c == byte)?;
    u32::try_from(index).ok()
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups().into_iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            for digit in encode_group(group) {
                write!(f, "{}", char::from(digit))?;
            }
        }
        Ok(())
    }
}

impl FromStr for Guid {
    type Err = GuidError;

    /// Parse the text form. Does not check the checksum; see [`Guid::verify`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GuidError::Malformed {
            input: s.to_owned(),
        };
        if s.len() != ENCODED_LEN {
            return Err(malformed());
        }

        let mut bytes = [0u8; GUID_LEN];
        let mut parts = s.split(SEPARATOR);
        for (group, chunk) in bytes.chunks_exact_mut(4).enumerate() {
            let part = parts.next().ok_or_else(malformed)?;
            if part.len() != GROUP_WIDTH {
                return Err(malformed());
            }
            let mut value: u32 = 0;
            for symbol in part.chars() {
                let digit = digit_value(symbol).ok_or(GuidError::InvalidSymbol { symbol })?;
                value = value
                    .checked_mul(BASE)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or(GuidError::GroupOverflow { group })?;
            }
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self(bytes))
    }
}
