// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! taglog CLI
//!
//! `resolve` rewrites tag logs, `guid` mints an identifier, `verify` checks
//! identifiers. Data goes to stdout, diagnostics to stderr; any failure exits
//! non-zero.

mod cli;
mod commands;
mod logging;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use taglog_config_fs::FsConfigStore;
use taglog_core::config::{ConfigService, TaglogConfig};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config_dir.as_deref())?;

    let filter = cli
        .log
        .as_deref()
        .or(config.log_filter.as_deref())
        .unwrap_or(logging::DEFAULT_FILTER);
    logging::init(filter)?;

    match cli.command {
        Command::Resolve { files, summary } => commands::resolve(&files, summary || config.summary),
        Command::Guid { entropy } => {
            commands::guid(commands::entropy_path(entropy.as_deref(), &config))
        }
        Command::Verify { guids } => commands::verify(&guids),
    }
}

fn load_config(dir: Option<&Path>) -> Result<TaglogConfig> {
    let store = match dir {
        Some(dir) => FsConfigStore::at(dir),
        // No resolvable home directory means no user config, not an error.
        None => match FsConfigStore::user() {
            Ok(store) => store,
            Err(_) => return Ok(TaglogConfig::default()),
        },
    };
    let service = ConfigService::new(store);
    service.load_taglog().with_context(|| {
        let path = service.store().path_for(taglog_core::config::CONFIG_KEY);
        format!("failed to load config {}", path.display())
    })
}
