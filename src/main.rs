// src/main.rs
// =============================================================================
// Entry point.
//
// Parse the command line, build the run configuration, then race the walk
// against Ctrl+C. Exit codes: 0 on a completed walk, 1 on a configuration
// error or an interrupt. Fetch failures never change the exit code; they are
// warnings.
// =============================================================================

mod cli;
mod extract;
mod fetch;
mod mirror;
mod policy;
mod report;
mod urls;
mod walker;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use fetch::HttpFetcher;
use report::ConsoleReporter;
use walker::Walker;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .init();

    // Everything that can be rejected is rejected here, before any network
    // activity starts.
    let config = cli.into_config()?;

    let fetcher = HttpFetcher::new(&config)?;
    let reporter = ConsoleReporter::new(&config);
    let mut walker = Walker::new(config, fetcher, reporter);

    tokio::select! {
        result = walker.run() => {
            result?;
            Ok(0)
        }
        _ = tokio::signal::ctrl_c() => {
            // Fully written files stay valid; whatever transfer was in
            // flight is simply dropped.
            eprintln!("\n^C interrupt");
            Ok(1)
        }
    }
}
