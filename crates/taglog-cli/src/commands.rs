// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use taglog_core::config::TaglogConfig;
use taglog_core::{EntropySource, Guid, OsEntropy, ReaderEntropy, TagResolver};
use tracing::{debug, info};

const STDIN_PATH: &str = "-";

/// Stream every input through one resolver, writing to stdout.
pub fn resolve(files: &[PathBuf], summary: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut resolver = TagResolver::new();

    if files.is_empty() {
        resolver
            .resolve_stream(io::stdin().lock(), &mut out)
            .context("resolving <stdin>")?;
    }
    for path in files {
        if path == Path::new(STDIN_PATH) {
            resolver
                .resolve_stream(io::stdin().lock(), &mut out)
                .context("resolving <stdin>")?;
            continue;
        }
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        debug!(path = %path.display(), "resolving");
        resolver
            .resolve_stream(BufReader::new(file), &mut out)
            .with_context(|| format!("resolving {}", path.display()))?;
    }
    out.flush()?;

    let stats = resolver.stats();
    let known = resolver.registry().len();
    if summary {
        info!(
            lines = stats.lines,
            rewritten = stats.rewritten,
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            definitions = stats.definitions,
            known,
            "resolve complete"
        );
    } else {
        debug!(?stats, known, "resolve complete");
    }
    Ok(())
}

/// Print one GUID drawn from `entropy` (or the OS generator).
pub fn guid(entropy: Option<&Path>) -> Result<()> {
    let mut source: Box<dyn EntropySource> = match entropy {
        Some(path) => Box::new(
            ReaderEntropy::<File>::open(path)
                .with_context(|| format!("failed to open entropy source {}", path.display()))?,
        ),
        None => Box::new(OsEntropy),
    };
    let guid = Guid::generate(source.as_mut()).context("failed to generate GUID")?;
    debug!(%guid, bytes = ?guid.as_bytes(), "generated");
    writeln!(io::stdout().lock(), "{guid}")?;
    Ok(())
}

/// Parse and checksum each GUID; stop at the first bad one.
pub fn verify(guids: &[String]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for text in guids {
        let guid: Guid = text.parse().with_context(|| format!("invalid GUID `{text}`"))?;
        guid.verify().with_context(|| format!("invalid GUID `{text}`"))?;
        writeln!(out, "{text} ok")?;
    }
    Ok(())
}

/// Entropy path from the flag, else from the config.
pub fn entropy_path<'a>(flag: Option<&'a Path>, config: &'a TaglogConfig) -> Option<&'a Path> {
    flag.or(config.entropy_path.as_deref())
}
