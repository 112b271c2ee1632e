// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pigo",
    about = "An interactive terminal coding agent",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional initial prompt, run before entering the interactive loop.
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Path to config file (overrides auto-discovery).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Model override, e.g. "gpt-4o" or "openai/gpt-4o-mini".
    #[arg(long, short = 'M', env = "PIGO_MODEL")]
    pub model: Option<String>,

    /// Directory tree the filesystem and shell tools may operate within.
    /// Defaults to the config value, then the current working directory.
    #[arg(long, value_name = "PATH")]
    pub allowed_root: Option<PathBuf>,

    /// Resume a saved session. Supply an ID, or omit it to resume the most
    /// recently modified session.
    #[arg(long, value_name = "ID", num_args = 0..=1, default_missing_value = "")]
    pub resume: Option<String>,

    /// Increase verbosity (-v = debug, -vv = trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration and exit.
    ShowConfig,
    /// List saved sessions and exit.
    Sessions {
        /// Maximum number of sessions to show.
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },
}
