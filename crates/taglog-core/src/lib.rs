// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tag resolution for transaction logs, plus the GUIDs those logs reference.
//!
//! Two independent pieces:
//!
//! - [`TagResolver`] makes one forward pass over log lines. `AT` records teach
//!   it names for raw identifiers; `TP` records are rewritten so every known
//!   identifier reads as its name. The registry it builds is owned by the
//!   resolver and dies with it.
//! - [`Guid`] mints and parses the checksummed, base-41 identifiers that
//!   appear as raw tags in those records.
//!
//! # Failure Policy
//!
//! Lookup misses are normal and never fail. Structural violations (empty
//! lines, an `AT` subject without the `G` marker, any `MT` record) abort the
//! run; there is no per-line recovery.
#![forbid(unsafe_code)]

pub mod config;
pub mod guid;
pub mod record;
pub mod registry;
pub mod resolver;

pub use guid::{EntropySource, Guid, GuidError, OsEntropy, ReaderEntropy};
pub use record::{DataHeader, Directive, LogRecord, Marker, RecordError, TagField};
pub use registry::TagRegistry;
pub use resolver::{ResolveError, ResolveStats, TagResolver};
