//! llcmp CLI - compare llc statistics between two toolchains

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    // Initialize metrics recorder if enabled
    let metrics_handle = if cli.metrics {
        llcmp::metrics::CliRecorder::new().install()
    } else {
        None
    };
    llcmp::metrics::init();

    let default_filter = if cli.verbose {
        "llcmp=debug,llcmp_stats=debug"
    } else if cli.silent {
        "llcmp=error,llcmp_stats=error"
    } else {
        "llcmp=info,llcmp_stats=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let exit_code = commands::run_command(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}
