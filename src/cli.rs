use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: MaltCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum MaltCommand {
    /// Scaffold a formula template (`malt.toml`) in the current directory
    Init {
        /// Tool name. Defaults to the current directory name
        name: Option<String>,
    },
    /// Print formula metadata
    Info {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
    },
    /// Statically check a formula for problems (empty checksum, bad version, ...)
    Audit {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
    },
    /// Download and verify the source archive without building
    Fetch {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
    },
    /// Fetch, verify, build and install the formula's binary
    Install {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
        /// Installation prefix. Defaults to `.malt` in the current directory
        #[clap(long)]
        prefix: Option<PathBuf>,
        /// VCS short commit hash injected into the binary. Defaults to the
        /// working directory's git head
        #[clap(long)]
        commit: Option<String>,
        /// ISO-8601 UTC build timestamp injected into the binary. Defaults to now
        #[clap(long)]
        date: Option<String>,
        /// Keep the staging directory for inspection
        #[clap(long)]
        keep_staging: bool,
    },
    /// Run the installed binary's version check
    Test {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
        #[clap(long)]
        prefix: Option<PathBuf>,
    },
    /// Remove the installed binary and its receipt
    Uninstall {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
        #[clap(long)]
        prefix: Option<PathBuf>,
    },
    /// Print the installed binary path
    Which {
        #[clap(default_value = "malt.toml")]
        formula: PathBuf,
        #[clap(long)]
        prefix: Option<PathBuf>,
    },
    /// List install receipts under the prefix
    List {
        #[clap(long)]
        prefix: Option<PathBuf>,
        #[clap(short, long)]
        verbose: bool,
    },
    /// Empty the global archive cache
    Clean,
}
