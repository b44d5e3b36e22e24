//! paws - run PowerShell scripts on provisioned Windows machines

use clap::Parser;
use tracing_subscriber::EnvFilter;

use paws_cli::cli::Cli;
use paws_cli::domain::WinsetupError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = cli.run().await {
        tracing::error!("{e:#}");
        let code = e.downcast_ref::<WinsetupError>().map_or(1, WinsetupError::exit_code);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
