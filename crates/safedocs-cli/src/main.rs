use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod output;
mod progress;
mod ui;

/// Exit code for anything that stops the run outright.
const EXIT_FATAL: i32 = 2;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("safedocs-setup error: {error:#}");
            std::process::exit(EXIT_FATAL);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(&flags)?;
    ui::init(&flags);

    let root = bootstrap::resolve_root(flags.root.as_deref())?;
    let config = bootstrap::load_config(&root)?;

    match cli.mode() {
        cli::Mode::Restore => commands::restore::handle(&root, &config, &flags),
        cli::Mode::TestOnly => commands::test_only::handle(&root, &config, &flags),
        cli::Mode::Setup { skip_deps } => commands::setup::handle(&root, &config, &flags, skip_deps),
    }
}

fn init_tracing(flags: &cli::GlobalFlags) -> anyhow::Result<()> {
    let level = if flags.quiet {
        "error"
    } else if flags.verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SAFEDOCS_SETUP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
