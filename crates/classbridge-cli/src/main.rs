use classbridge_cli::cli::Cli;
use classbridge_cli::commands;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    commands::run(cli)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "classbridge=debug,classbridge_classifier=debug,classbridge_cli=debug"
    } else {
        "classbridge=info,classbridge_classifier=info,classbridge_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
