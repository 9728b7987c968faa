use std::{io, path::PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fetch_urls::{Client, config, fetch, flickr, output};

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Config(#[from] config::Error),

    #[error("{0}")]
    Flickr(#[from] flickr::Error),

    #[error("No configuration folder available, pass one as the first argument")]
    NoConfigFolder,
}

type Result<T> = core::result::Result<T, Error>;

fn config_folder() -> Result<PathBuf> {
    match std::env::args_os().nth(1) {
        Some(folder) => Ok(PathBuf::from(folder)),
        None => config::default_folder().ok_or(Error::NoConfigFolder),
    }
}

async fn run() -> Result<()> {
    let config = config::configure(config_folder()?)?;

    let client = Client::new_from_env()?.with_license(config.search.license.clone());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, stopping after the current request");
            ctrl_c.cancel();
        }
    });

    let orchestrator = fetch::orchestrator(client, &config.fetch, cancel);
    let report = orchestrator.fetch_all(&config.classes).await;

    if report.cancelled {
        warn!(
            classes = report.urls.len(),
            "stopped by user, writing partial results"
        );
    }

    output::write_urls(&config.output, &report.urls)?;
    info!(path = %config.output.display(), classes = report.urls.len(), "urls written");

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
