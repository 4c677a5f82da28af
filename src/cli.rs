//! Command-line interface definitions for news_digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be supplied through an environment variable.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::manifest::UnfilteredOrder;
use crate::resolver::{ResolverConfig, SourceMode, StalePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Live,
    Static,
}

impl From<ModeArg> for SourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Live => SourceMode::Live,
            ModeArg::Static => SourceMode::Static,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Command-line arguments for news_digest.
///
/// # Examples
///
/// ```sh
/// # Static snapshots published under a site's data/ folder
/// news_digest --data-base https://example.github.io/digest/data/
///
/// # Local development server with live endpoint, JSON output
/// news_digest --mode live --api-base http://localhost:5000 --format json healthcare
///
/// # Snapshots on disk
/// news_digest --data-dir ./data general
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Categories to resolve
    #[arg(default_values_t = ["healthcare".to_string(), "general".to_string()])]
    pub categories: Vec<String>,

    /// Where to look first: the live endpoint or the static snapshots
    #[arg(long, value_enum, env = "NEWS_DIGEST_MODE", default_value = "static")]
    pub mode: ModeArg,

    /// Root URL of the live API (serves /api/{category})
    #[arg(long, env = "NEWS_DIGEST_API_BASE", default_value = "http://localhost:5000/")]
    pub api_base: String,

    /// Root URL of the static snapshot files and manifest
    #[arg(long, env = "NEWS_DIGEST_DATA_BASE", default_value = "http://localhost:5000/data/")]
    pub data_base: String,

    /// Read snapshots from a local directory instead of over HTTP
    #[arg(long, env = "NEWS_DIGEST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Manifest filename inside the data root
    #[arg(long, env = "NEWS_DIGEST_MANIFEST", default_value = "index.json")]
    pub manifest_name: String,

    /// Overall time budget per category before using the fallback digest
    #[arg(long, env = "NEWS_DIGEST_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Timeout for a single HTTP request
    #[arg(long, env = "NEWS_DIGEST_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// Retries for transient network failures, per request
    #[arg(long, env = "NEWS_DIGEST_RETRIES", default_value_t = 1)]
    pub retries: usize,

    /// Sort manifest entries by date in the window-free tier instead of
    /// trusting their listed order
    #[arg(long)]
    pub resort_unfiltered: bool,

    /// Ignore snapshots older than the daily window
    #[arg(long)]
    pub skip_stale: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,
}

impl Cli {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            unfiltered_order: if self.resort_unfiltered {
                UnfilteredOrder::Resort
            } else {
                UnfilteredOrder::TrustManifest
            },
            stale_policy: if self.skip_stale {
                StalePolicy::Skip
            } else {
                StalePolicy::Accept
            },
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            ..ResolverConfig::default()
        }
    }
}
