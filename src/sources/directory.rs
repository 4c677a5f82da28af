//! Snapshot source reading a local `data/` directory.
//!
//! This mirrors how the dashboard's development server behaves: snapshot
//! files sit side by side in one folder, the "live" answer for a category is
//! simply the newest file for it, and the manifest is an `index.json` next to
//! them.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use super::{SnapshotSource, check_category, check_filename, parse_body};
use crate::error::{ResolveError, Result};
use crate::models::{Manifest, Snapshot};
use crate::window::parse_snapshot_filename;

#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    manifest_name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_name: "index.json".to_string(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, filename: &str) -> Result<T> {
        check_filename(filename)?;
        let path = self.root.join(filename);
        let body = fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResolveError::NotFound(path.display().to_string())
            } else {
                ResolveError::Io(e)
            }
        })?;
        parse_body(&body, &path.display().to_string())
    }

    /// Newest snapshot filename for `category`, by the date in its name.
    #[instrument(level = "debug", skip(self))]
    async fn latest_for(&self, category: &str) -> Result<String> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut latest: Option<(chrono::NaiveDate, String)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(parsed) = parse_snapshot_filename(&name) else {
                continue;
            };
            if parsed.category != category {
                continue;
            }
            if latest.as_ref().is_none_or(|(date, _)| parsed.date > *date) {
                latest = Some((parsed.date, name));
            }
        }
        let (_, name) = latest.ok_or_else(|| {
            ResolveError::NotFound(format!(
                "no snapshot for {category} in {}",
                self.root.display()
            ))
        })?;
        debug!(%name, "Latest snapshot on disk");
        Ok(name)
    }
}

impl SnapshotSource for DirectorySource {
    async fn fetch_live(&self, category: &str) -> Result<Snapshot> {
        check_category(category)?;
        let name = self.latest_for(category).await?;
        self.read_json(&name).await
    }

    async fn fetch_manifest(&self) -> Result<Manifest> {
        self.read_json(&self.manifest_name).await
    }

    async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot> {
        self.read_json(filename).await
    }
}
