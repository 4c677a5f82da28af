//! # news_digest
//!
//! Resolve and print the news digest for one or more categories.
//!
//! ## Usage
//!
//! ```sh
//! news_digest --data-base https://example.github.io/digest/data/ healthcare general
//! ```
//!
//! Logs go to stderr (`RUST_LOG` controls verbosity); the digest goes to
//! stdout. Ctrl-C aborts pending lookups and prints the fallback digest for
//! whatever had not resolved yet.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_digest::cli::{Cli, Format};
use news_digest::models::Digest;
use news_digest::outputs::{JsonRenderer, Renderer, TextRenderer};
use news_digest::sources::http::base_url;
use news_digest::window::Clock;
use news_digest::{
    DirectorySource, HttpSource, HttpSourceConfig, Resolver, RetrySource, SnapshotSource,
    SourceMode,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let retry_delay = Duration::from_millis(250);
    match &args.data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Reading snapshots from local directory");
            let source = DirectorySource::new(dir).with_manifest_name(&args.manifest_name);
            run(&args, RetrySource::new(source, args.retries, retry_delay)).await?;
        }
        None => {
            let mut config = HttpSourceConfig::new(base_url(&args.api_base)?, base_url(&args.data_base)?);
            config.manifest_name = args.manifest_name.clone();
            config.request_timeout = Duration::from_secs(args.request_timeout_secs.max(1));
            info!(api_base = %config.api_base, data_base = %config.data_base, "Reading snapshots over HTTP");
            let source = HttpSource::new(config)?;
            run(&args, RetrySource::new(source, args.retries, retry_delay)).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

async fn run<S: SnapshotSource>(args: &Cli, source: S) -> Result<(), Box<dyn Error>> {
    let resolver = Resolver::new(source).with_config(args.resolver_config());
    let mode = SourceMode::from(args.mode);

    // Ctrl-C flips the flag; every pending resolution watches it.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; falling back for unresolved categories");
            let _ = cancel_tx.send(true);
        }
        // Keep the sender alive so receivers do not read a closed channel as a cancel.
        std::future::pending::<()>().await;
    });

    let categories: Vec<&String> = args.categories.iter().unique().collect();
    let resolutions = futures::future::join_all(categories.into_iter().map(|category| {
        let mut cancel_rx = cancel_rx.clone();
        let resolver = &resolver;
        async move {
            let cancelled = async move {
                let _ = cancel_rx.wait_for(|cancelled| *cancelled).await;
            };
            resolver.resolve_until(category, mode, cancelled).await
        }
    }))
    .await;

    let today = resolver.clock().today_utc();
    let digests: Vec<Digest> = resolutions
        .iter()
        .map(|resolution| Digest::from_resolution(resolution, today))
        .collect();

    let renderer: &dyn Renderer = match args.format {
        Format::Text => &TextRenderer,
        Format::Json => &JsonRenderer,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    renderer.render(&digests, &mut out)?;
    Ok(())
}
