//! Data models for digest snapshots and the manifest that indexes them.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`NewsItem`]: A single story as produced by the snapshot generator
//! - [`Snapshot`]: One category's digest for one capture date
//! - [`Manifest`]: Category name to dated snapshot filenames
//! - [`Digest`]: The renderer-facing view of a resolved snapshot
//!
//! Field names match the generator's JSON exactly, so no renames are needed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resolver::{Freshness, Resolution, Tier};

/// Number of daily stories shown beneath the weekly highlight.
pub const TOP_STORY_COUNT: usize = 3;

/// A single story in a snapshot.
///
/// Every field is required; a payload missing any of them fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    /// The story headline.
    pub headline: String,
    /// A two or three sentence summary.
    pub summary: String,
    /// Publication the story came from (e.g. "Reuters").
    pub source: String,
    /// Global significance, 1 (routine) to 5 (exceptional).
    pub importance: u8,
    /// Relevance to the reader, 1 to 5.
    pub impact_to_me: u8,
    /// Display tag such as "Policy" or "Research".
    pub category: String,
    /// Link to the story. May lack a scheme or carry `\uXXXX` escapes;
    /// run it through [`crate::url_norm::normalize_url`] before display.
    pub url: String,
}

/// One complete digest payload for a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    /// The highlighted story of the week.
    pub weekly_top_story: NewsItem,
    /// The day's stories in generator order.
    pub stories: Vec<NewsItem>,
}

impl Snapshot {
    /// The `n` most important stories, highest first.
    ///
    /// The sort is stable, so stories with equal importance keep the order
    /// the generator wrote them in.
    pub fn top_stories(&self, n: usize) -> Vec<&NewsItem> {
        let mut ranked: Vec<&NewsItem> = self.stories.iter().collect();
        ranked.sort_by(|a, b| b.importance.cmp(&a.importance));
        ranked.truncate(n);
        ranked
    }
}

/// Index of available snapshot files, keyed by category.
///
/// Each list is expected, but not guaranteed, to be newest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest(pub BTreeMap<String, Vec<String>>);

impl Manifest {
    /// Filenames listed for `category`, empty if the category is absent.
    pub fn entries(&self, category: &str) -> &[String] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// What a renderer needs to draw one category's page.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub category: String,
    pub weekly_top_story: NewsItem,
    pub top_stories: Vec<NewsItem>,
    /// Tier that produced the snapshot.
    pub tier: Tier,
    pub freshness: Freshness,
    /// Capture date from the snapshot filename, when the tier knows it.
    pub captured_on: Option<chrono::NaiveDate>,
    /// Whether the weekly highlight is still inside the Weekly window.
    pub weekly_story_current: bool,
}

impl Digest {
    pub fn from_resolution(resolution: &Resolution, today_utc: chrono::NaiveDate) -> Self {
        let snapshot = &resolution.snapshot;
        Self {
            category: resolution.category.clone(),
            weekly_top_story: snapshot.weekly_top_story.clone(),
            top_stories: snapshot
                .top_stories(TOP_STORY_COUNT)
                .into_iter()
                .cloned()
                .collect(),
            tier: resolution.tier,
            freshness: resolution.freshness,
            captured_on: resolution.captured_on,
            weekly_story_current: resolution.weekly_story_current(today_utc),
        }
    }
}

#[cfg(test)]
pub(crate) fn item(headline: &str, importance: u8) -> NewsItem {
    NewsItem {
        headline: headline.to_string(),
        summary: format!("{headline} summary"),
        source: "Test Wire".to_string(),
        importance,
        impact_to_me: 3,
        category: "Test".to_string(),
        url: "https://example.com/story".to_string(),
    }
}
