//! # news_digest
//!
//! Resolves the news digest for a category: a weekly top story plus the
//! day's three most important stories, from whichever source currently has
//! the freshest valid snapshot.
//!
//! ## Architecture
//!
//! - [`sources`]: where snapshots come from (HTTP, local directory, retry)
//! - [`window`] and [`manifest`]: recency windows and manifest candidate selection
//! - [`resolver`]: the tiered fallback chain; never fails
//! - [`fallback`]: embedded placeholder digests
//! - [`outputs`]: text and JSON renderers
//!
//! ```ignore
//! let source = HttpSource::new(HttpSourceConfig::new(api_base, data_base))?;
//! let resolver = Resolver::new(source);
//! let resolution = resolver.resolve("healthcare", SourceMode::Static).await;
//! let digest = Digest::from_resolution(&resolution, resolver.clock().today_utc());
//! ```

pub mod cli;
pub mod error;
pub mod fallback;
pub mod manifest;
pub mod models;
pub mod outputs;
pub mod resolver;
pub mod sources;
pub mod url_norm;
pub mod utils;
pub mod window;

pub use error::{ErrorKind, ResolveError};
pub use fallback::{BuiltinFallback, FallbackProvider};
pub use models::{Digest, Manifest, NewsItem, Snapshot};
pub use resolver::{
    Freshness, Resolution, Resolver, ResolverConfig, SourceMode, StalePolicy, Tier, TierOutcome,
};
pub use sources::{DirectorySource, HttpSource, HttpSourceConfig, RetrySource, SnapshotSource};
pub use url_norm::normalize_url;
pub use window::{Clock, FixedClock, SystemClock, WindowKind};
