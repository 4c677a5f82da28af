//! Snapshot sources the resolver reads from.
//!
//! Every source answers the same three questions through [`SnapshotSource`]:
//!
//! | Method | HTTP ([`http`]) | Local directory ([`directory`]) |
//! |--------|-----------------|---------------------------------|
//! | `fetch_live` | `GET {api_base}/api/{category}` | newest `*-{category}.json` by name |
//! | `fetch_manifest` | `GET {data_base}/{manifest}` | `{root}/{manifest}` |
//! | `fetch_snapshot` | `GET {data_base}/{filename}` | `{root}/{filename}` |
//!
//! [`retry::RetrySource`] wraps any source with backoff for transient
//! network failures.
//!
//! Sources report failures as [`ResolveError`]; they never fall back on
//! their own. Choosing the next tier is the resolver's job.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::models::{Manifest, Snapshot};
use crate::utils::{looks_truncated, truncate_for_log};
use crate::window::is_valid_category;

pub mod directory;
pub mod http;
pub mod retry;

pub use directory::DirectorySource;
pub use http::{HttpSource, HttpSourceConfig};
pub use retry::RetrySource;

/// Where snapshots and the manifest come from.
pub trait SnapshotSource {
    /// Current snapshot from the live endpoint for `category`.
    async fn fetch_live(&self, category: &str) -> Result<Snapshot>;

    /// The static index of dated snapshot files.
    async fn fetch_manifest(&self) -> Result<Manifest>;

    /// A static snapshot file by name, e.g. `2025-08-27-general.json`.
    async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot>;
}

impl<S: SnapshotSource> SnapshotSource for &S {
    async fn fetch_live(&self, category: &str) -> Result<Snapshot> {
        (**self).fetch_live(category).await
    }

    async fn fetch_manifest(&self) -> Result<Manifest> {
        (**self).fetch_manifest().await
    }

    async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot> {
        (**self).fetch_snapshot(filename).await
    }
}

/// Deserialize a downloaded or read body, logging a preview on failure.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, origin: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        debug!(
            %origin,
            error = %e,
            truncated = looks_truncated(&e),
            preview = %truncate_for_log(body, 200),
            "Body did not parse"
        );
        ResolveError::from(e)
    })
}

pub(crate) fn check_category(category: &str) -> Result<()> {
    if is_valid_category(category) {
        Ok(())
    } else {
        Err(ResolveError::InvalidCategory(category.to_string()))
    }
}

/// Manifest entries are untrusted input that ends up in paths and URLs.
/// Only a bare `*.json` name with no separators is fetched.
pub(crate) fn check_filename(filename: &str) -> Result<()> {
    let ok = filename.ends_with(".json")
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\'])
        && !filename.contains("..");
    if ok {
        Ok(())
    } else {
        Err(ResolveError::NotFound(format!("unusable snapshot filename {filename:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_filename() {
        assert!(check_filename("2025-08-27-general.json").is_ok());
        assert!(check_filename("latest.json").is_ok());
        assert!(check_filename("../2025-08-27-general.json").is_err());
        assert!(check_filename("sub/2025-08-27-general.json").is_err());
        assert!(check_filename(".hidden.json").is_err());
        assert!(check_filename("2025-08-27-general.txt").is_err());
    }

    #[test]
    fn test_parse_body_reports_parse_failure() {
        let err = parse_body::<Snapshot>("{\"stories\": []}", "test").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ParseFailure);
    }
}
