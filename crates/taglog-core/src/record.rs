// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structured view of a single transaction-log line.
//!
//! A data record (`D` kind) starts with a fixed 20-byte header:
//!
//! ```text
//! D 0000000000000001 T TP anchor Gxxxxxx-... Nname ...
//! ^ ^                ^ ^  ^
//! | transaction id   | |  field list (whitespace separated)
//! kind               | directive code
//!                    command class
//! ```
//!
//! (spaces added for readability; the header has none). Everything after the
//! header is a list of fields separated by ASCII whitespace. Every other kind
//! of record is opaque to this crate and passes through untouched.
//!
//! Lines are bytes, not text. Offsets count bytes and nothing here requires
//! UTF-8, so records with arbitrary payloads classify and pass through intact.

use thiserror::Error;

/// Record kind byte marking a data record.
pub const DATA_KIND: u8 = b'D';
/// Width of the record kind.
pub const KIND_LEN: usize = 1;
/// Width of the hex transaction id that follows the kind.
pub const TRANSACTION_LEN: usize = 16;
/// Offset of the one-byte command class.
pub const CLASS_OFFSET: usize = KIND_LEN + TRANSACTION_LEN;
/// Offset of the two-byte directive code.
pub const DIRECTIVE_OFFSET: usize = CLASS_OFFSET + 1;
/// Width of the directive code.
pub const DIRECTIVE_LEN: usize = 2;
/// Total header width; the field list starts here.
pub const HEADER_LEN: usize = DIRECTIVE_OFFSET + DIRECTIVE_LEN;

/// Errors raised while classifying a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The line had no bytes at all.
    #[error("[RECORD_EMPTY] log line is empty")]
    Empty,
}

/// Intent of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `TP`: tag-put. Anchor field followed by tag fields to resolve.
    TagPut,
    /// `AT`: attribute. Subject identifier followed by name fields.
    Attribute,
    /// `MT`: multi-tag. Not supported; processing aborts when seen.
    MultiTag,
    /// Any other directive code. Passed through.
    Other(&'a [u8]),
}

impl<'a> Directive<'a> {
    /// Interpret a two-byte directive code.
    pub fn from_code(code: &'a [u8]) -> Self {
        match code {
            b"TP" => Self::TagPut,
            b"AT" => Self::Attribute,
            b"MT" => Self::MultiTag,
            other => Self::Other(other),
        }
    }

    /// The code as it appears on the wire.
    pub fn code(&self) -> &'a [u8] {
        match self {
            Self::TagPut => b"TP",
            Self::Attribute => b"AT",
            Self::MultiTag => b"MT",
            Self::Other(code) => code,
        }
    }
}

/// Fixed-width prefix of a data record. Never altered by rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader<'a> {
    raw: &'a [u8],
}

impl<'a> DataHeader<'a> {
    /// The full header (kind through directive).
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }

    /// Transaction id exactly as written.
    pub fn transaction_text(&self) -> &'a [u8] {
        &self.raw[KIND_LEN..CLASS_OFFSET]
    }

    /// Transaction id parsed as hex, if it is well formed.
    pub fn transaction_id(&self) -> Option<u64> {
        let text = std::str::from_utf8(self.transaction_text()).ok()?;
        u64::from_str_radix(text, 16).ok()
    }

    /// Command class byte.
    pub fn class(&self) -> u8 {
        self.raw[CLASS_OFFSET]
    }

    /// Directive carried by this record.
    pub fn directive(&self) -> Directive<'a> {
        Directive::from_code(&self.raw[DIRECTIVE_OFFSET..HEADER_LEN])
    }
}

/// A classified log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord<'a> {
    /// A `D` record with a complete header.
    Data {
        /// Fixed prefix.
        header: DataHeader<'a>,
        /// Fields after the header, split on runs of ASCII whitespace.
        fields: Vec<&'a [u8]>,
    },
    /// Any other line, including `D` lines too short to carry a directive.
    Passthrough {
        /// First byte of the line.
        kind: u8,
    },
}

impl<'a> LogRecord<'a> {
    /// Classify `line` (without its newline terminator).
    pub fn parse(line: &'a [u8]) -> Result<Self, RecordError> {
        let kind = *line.first().ok_or(RecordError::Empty)?;
        if kind != DATA_KIND || line.len() < HEADER_LEN {
            return Ok(Self::Passthrough { kind });
        }
        let (prefix, rest) = line.split_at(HEADER_LEN);
        Ok(Self::Data {
            header: DataHeader { raw: prefix },
            fields: split_fields(rest),
        })
    }

    /// Directive of a data record; `None` for pass-through lines.
    pub fn directive(&self) -> Option<Directive<'a>> {
        match self {
            Self::Data { header, .. } => Some(header.directive()),
            Self::Passthrough { .. } => None,
        }
    }
}

fn split_fields(rest: &[u8]) -> Vec<&[u8]> {
    rest.split(u8::is_ascii_whitespace)
        .filter(|word| !word.is_empty())
        .collect()
}

/// Marker prefix of a tag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `G`: raw, unresolved identifier.
    Guid,
    /// `N`: resolved human-readable name.
    Name,
    /// Anything else.
    Other(u8),
}

impl Marker {
    /// Marker for raw identifiers.
    pub const GUID_BYTE: u8 = b'G';
    /// Marker for resolved names.
    pub const NAME_BYTE: u8 = b'N';

    /// Map a marker byte.
    pub fn from_byte(b: u8) -> Self {
        match b {
            Self::GUID_BYTE => Self::Guid,
            Self::NAME_BYTE => Self::Name,
            other => Self::Other(other),
        }
    }

    /// Byte written on the wire.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Guid => Self::GUID_BYTE,
            Self::Name => Self::NAME_BYTE,
            Self::Other(b) => b,
        }
    }
}

/// A marker-prefixed word from a record's field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagField<'a> {
    /// Marker byte.
    pub marker: Marker,
    /// Everything after the marker. May be empty.
    pub payload: &'a [u8],
}

impl<'a> TagField<'a> {
    /// Split a field into marker and payload. `None` for an empty word.
    pub fn parse(word: &'a [u8]) -> Option<Self> {
        let (&first, payload) = word.split_first()?;
        Some(Self {
            marker: Marker::from_byte(first),
            payload,
        })
    }

    /// Registry key of this field: the payload, regardless of marker.
    pub fn key(&self) -> &'a [u8] {
        self.payload
    }
}
