use clap::Parser;
use miette::Result;
use mbf::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => mbf::cli::parse::run(args, config)?,
        Commands::Markers(args) => mbf::cli::markers::run(args, config)?,
        Commands::Rasterize(args) => mbf::cli::rasterize::run(args, config)?,
        Commands::Validate(args) => mbf::cli::validate::run(args, config)?,
        Commands::Batch(args) => mbf::cli::batch::run(args, config)?,
        Commands::Completions(args) => mbf::cli::completions::run(args)?,
    }

    Ok(())
}
