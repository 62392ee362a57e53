use clap::Parser;

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `safedocs-setup` binary.
#[derive(Debug, Parser)]
#[command(
    name = "safedocs-setup",
    version,
    about = "Install, upgrade and verify a SafeDocs deployment"
)]
pub struct Cli {
    /// Restore the last snapshot and exit
    #[arg(long, conflicts_with_all = ["test_only", "skip_deps"])]
    pub restore: bool,

    /// Run the readiness probes only
    #[arg(long)]
    pub test_only: bool,

    /// Skip dependency installation
    #[arg(long)]
    pub skip_deps: bool,

    /// Output format: json, table, raw
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no spinner)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(short, long)]
    pub root: Option<String>,
}

/// What a single invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Restore,
    TestOnly,
    Setup { skip_deps: bool },
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            root: self.root.clone(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.restore {
            Mode::Restore
        } else if self.test_only {
            Mode::TestOnly
        } else {
            Mode::Setup {
                skip_deps: self.skip_deps,
            }
        }
    }
}
