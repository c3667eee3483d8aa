// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resolve tag logs and mint GUIDs.
#[derive(Parser, Debug)]
#[command(name = "taglog", author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter for stderr diagnostics (e.g. `debug`); `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log: Option<String>,

    /// Read `taglog.json` from this directory instead of the user config dir.
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite tag-put records using names learned from attribute records.
    ///
    /// Files are processed in order as one stream; with no files (or `-`)
    /// standard input is read.
    Resolve {
        /// Log files to process.
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Log line and tag counts when the run completes.
        #[arg(long)]
        summary: bool,
    },

    /// Print one freshly generated GUID.
    Guid {
        /// Read entropy from this file (e.g. `/dev/random`) instead of the OS generator.
        #[arg(long, value_name = "PATH")]
        entropy: Option<PathBuf>,
    },

    /// Check that GUIDs parse and carry a valid checksum.
    Verify {
        /// GUIDs to check.
        #[arg(value_name = "GUID", required = true)]
        guids: Vec<String>,
    },
}
