use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use page_loader::{ConsoleObserver, LoadObserver, LoaderCommand, PageLoader, TracingObserver};

fn init_logging(verbose: bool) {
    let default = if verbose { "page_loader=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = LoaderCommand::parse();
    init_logging(args.verbose);

    let observer: Arc<dyn LoadObserver> = if args.quiet || args.json {
        Arc::new(TracingObserver)
    } else {
        Arc::new(ConsoleObserver::new())
    };

    let loader = PageLoader::new(args.to_config())
        .context("There was an error during execution")?
        .with_observer(observer);

    let outcome = loader
        .load(&args.url)
        .await
        .context("There was an error during execution")?;

    for failed in &outcome.report.failed {
        eprintln!("⚠️  {} {}", "Asset not saved:".yellow(), failed.error);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.page_path.display());
    }
    Ok(())
}
