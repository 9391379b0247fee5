use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tplwalker::config::{Cli, Config};
use tplwalker::walker::{TemplateWalker, TplWalker};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;
    init_logging(config.verbose);

    let mut walker = TplWalker::new(&config.source, config.suffix.as_str())
        .context("Invalid walker configuration")?;
    walker.ignore_dirs(&config.ignore);

    let start = Instant::now();
    let stats = walker
        .walk_templates(&config.destination, &config.context)
        .with_context(|| {
            format!(
                "Failed to mirror {} into {}",
                config.source.display(),
                config.destination.display()
            )
        })?;
    let duration = start.elapsed();

    println!(
        "Wrote {} entries ({} rendered, {} copied, {} links, {} dirs) in {:.2}s",
        stats.entries(),
        stats.templates_rendered,
        stats.files_copied,
        stats.symlinks,
        stats.directories,
        duration.as_secs_f64()
    );

    Ok(())
}
