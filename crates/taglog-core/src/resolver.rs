// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single forward pass that resolves tag identifiers to names.
//!
//! `AT` records teach the resolver a name for an identifier; `TP` records are
//! rewritten so every tag field already known carries `N<name>` and every
//! other tag field carries `G<identifier>`. Resolution is strictly in stream
//! order: a reference seen before its definition stays raw, and nothing that
//! has been emitted is revisited.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::record::{DataHeader, Directive, LogRecord, Marker, RecordError, TagField};
use crate::registry::TagRegistry;

/// Fatal conditions that abort a resolver run.
///
/// Line numbers are 1-based and count every line this resolver has seen,
/// across all streams fed to it.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The line could not be classified.
    #[error("[RESOLVE_RECORD] line {line}: malformed record")]
    Record {
        /// Offending line.
        line: u64,
        /// Classification failure.
        #[source]
        source: RecordError,
    },
    /// An `AT` record carried no fields.
    #[error("[RESOLVE_AT_NO_SUBJECT] line {line}: attribute record has no subject")]
    MissingSubject {
        /// Offending line.
        line: u64,
    },
    /// An `AT` record's subject was not a raw identifier.
    #[error("[RESOLVE_AT_SUBJECT] line {line}: attribute subject `{field}` is not marked `G`")]
    SubjectNotRaw {
        /// Offending line.
        line: u64,
        /// The subject field as written.
        field: String,
    },
    /// A directive this resolver refuses to handle (`MT`).
    #[error("[RESOLVE_UNSUPPORTED] line {line}: directive `{directive}` is not supported")]
    UnsupportedDirective {
        /// Offending line.
        line: u64,
        /// Directive code.
        directive: String,
    },
    /// Reading input or writing output failed.
    #[error("[RESOLVE_IO] {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for one resolver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Lines processed.
    pub lines: u64,
    /// `TP` lines rebuilt from resolved fields.
    pub rewritten: u64,
    /// Tag fields emitted as `N<name>`.
    pub resolved: u64,
    /// Tag fields emitted as `G<identifier>`.
    pub unresolved: u64,
    /// Names recorded from `AT` records.
    pub definitions: u64,
}

/// Stateful tag resolver. Owns the registry for the duration of one run.
#[derive(Debug, Default)]
pub struct TagResolver {
    registry: TagRegistry,
    stats: ResolveStats,
}

impl TagResolver {
    /// Create a resolver with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver seeded with an existing registry.
    pub fn with_registry(registry: TagRegistry) -> Self {
        Self {
            registry,
            stats: ResolveStats::default(),
        }
    }

    /// Names learned so far.
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Counters for the run so far.
    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// Consume the resolver and keep its registry.
    pub fn into_registry(self) -> TagRegistry {
        self.registry
    }

    /// Process one line (without its newline terminator).
    ///
    /// Returns the line to emit: borrowed when unchanged, owned when a `TP`
    /// record was rebuilt. Lines are raw bytes; only the header and the
    /// field separators need to be ASCII.
    pub fn resolve_line<'a>(&mut self, line: &'a [u8]) -> Result<Cow<'a, [u8]>, ResolveError> {
        self.stats.lines += 1;
        let line_no = self.stats.lines;
        let record =
            LogRecord::parse(line).map_err(|source| ResolveError::Record { line: line_no, source })?;

        let LogRecord::Data { header, fields } = record else {
            return Ok(Cow::Borrowed(line));
        };

        match header.directive() {
            Directive::TagPut => Ok(self.rewrite_tag_put(line, header, &fields)),
            Directive::Attribute => {
                self.apply_attribute(line_no, header, &fields)?;
                Ok(Cow::Borrowed(line))
            }
            Directive::MultiTag => Err(ResolveError::UnsupportedDirective {
                line: line_no,
                directive: String::from_utf8_lossy(Directive::MultiTag.code()).into_owned(),
            }),
            Directive::Other(_) => Ok(Cow::Borrowed(line)),
        }
    }

    /// Run the forward pass over `reader`, writing each processed line to
    /// `writer` as soon as it is ready.
    ///
    /// Stops at the first error; lines already written stay written.
    pub fn resolve_stream<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ResolveError>
    where
        R: BufRead,
        W: Write,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
            let out = self.resolve_line(line)?;
            writer.write_all(&out)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn rewrite_tag_put<'a>(
        &mut self,
        line: &'a [u8],
        header: DataHeader<'a>,
        fields: &[&'a [u8]],
    ) -> Cow<'a, [u8]> {
        // No anchor, or an anchor with nothing after it: nothing to resolve.
        let Some((anchor, tags)) = fields.split_first() else {
            return Cow::Borrowed(line);
        };
        if tags.is_empty() {
            return Cow::Borrowed(line);
        }

        let mut out = Vec::with_capacity(line.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(anchor);
        for word in tags {
            let key = TagField::parse(word).map_or(&b""[..], |field| field.key());
            out.push(b' ');
            match self.registry.lookup(key) {
                Some(name) => {
                    out.push(Marker::NAME_BYTE);
                    out.extend_from_slice(name);
                    self.stats.resolved += 1;
                }
                None => {
                    out.push(Marker::GUID_BYTE);
                    out.extend_from_slice(key);
                    self.stats.unresolved += 1;
                }
            }
        }
        self.stats.rewritten += 1;
        trace!(
            transaction = ?header.transaction_id(),
            class = %char::from(header.class()),
            out = %String::from_utf8_lossy(&out),
            "tag-put rewritten"
        );
        Cow::Owned(out)
    }

    fn apply_attribute(
        &mut self,
        line_no: u64,
        header: DataHeader<'_>,
        fields: &[&[u8]],
    ) -> Result<(), ResolveError> {
        let Some(first) = fields.first() else {
            return Err(ResolveError::MissingSubject { line: line_no });
        };
        let subject = match TagField::parse(first) {
            Some(field) if field.marker == Marker::Guid => field.key(),
            _ => {
                return Err(ResolveError::SubjectNotRaw {
                    line: line_no,
                    field: String::from_utf8_lossy(first).into_owned(),
                })
            }
        };

        for field in fields.iter().filter_map(|word| TagField::parse(word)) {
            if field.marker != Marker::Name {
                continue;
            }
            let previous = self.registry.define(subject, field.payload);
            self.stats.definitions += 1;
            debug!(
                transaction = ?header.transaction_id(),
                key = %String::from_utf8_lossy(subject),
                name = %String::from_utf8_lossy(field.payload),
                replaced = previous.is_some(),
                "tag name defined"
            );
        }
        Ok(())
    }
}
