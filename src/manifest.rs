//! Picking snapshot filenames out of a [`Manifest`].

use chrono::NaiveDate;
use itertools::Itertools;
use tracing::debug;

use crate::models::Manifest;
use crate::window::{WindowKind, filename_date, qualifies};

/// How the window-free manifest tier picks its entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnfilteredOrder {
    /// Take the first entry as listed; the generator writes newest-first.
    #[default]
    TrustManifest,
    /// Sort by filename date (newest first) before taking the first entry.
    Resort,
}

/// Filenames for `category` whose date passes the Daily window, newest first.
///
/// Entries without a parseable date are skipped. Entries sharing a date keep
/// their manifest order.
pub fn select_candidates(manifest: &Manifest, category: &str, today: NaiveDate) -> Vec<String> {
    let entries = manifest.entries(category);
    let candidates: Vec<String> = entries
        .iter()
        .filter_map(|name| filename_date(name).map(|date| (date, name)))
        .filter(|(date, _)| qualifies(*date, WindowKind::Daily, today))
        .sorted_by(|(a, _), (b, _)| b.cmp(a))
        .map(|(_, name)| name.clone())
        .collect();
    debug!(
        %category,
        listed = entries.len(),
        in_window = candidates.len(),
        "Selected manifest candidates"
    );
    candidates
}

/// The entry the window-free tier should fetch, if the category has any.
pub fn most_recent_entry(
    manifest: &Manifest,
    category: &str,
    order: UnfilteredOrder,
) -> Option<String> {
    let entries = manifest.entries(category);
    match order {
        UnfilteredOrder::TrustManifest => entries.first().cloned(),
        UnfilteredOrder::Resort => entries
            .iter()
            .sorted_by(|a, b| filename_date(b).cmp(&filename_date(a)))
            .next()
            .cloned(),
    }
}
