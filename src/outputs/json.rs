//! JSON output.
//!
//! Emits the digests as a pretty-printed array. Story links are normalized
//! so consumers can use them as-is.

use std::io::{self, Write};

use super::Renderer;
use crate::models::Digest;
use crate::url_norm::normalize_url;

/// Writes digests as one pretty-printed JSON array.
///
/// Each element is a serialized [`Digest`]: the category, the weekly top
/// story, the top stories in rank order, and the `tier`, `freshness`,
/// `captured_on` and `weekly_story_current` provenance fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    /// Serialize `digests` to `out`, followed by a newline.
    ///
    /// # Arguments
    ///
    /// * `digests` - Resolved digests, in the order they should appear
    /// * `out` - Destination writer (stdout in the CLI)
    ///
    /// # Returns
    ///
    /// `Ok(())` once the array is written, or the first I/O or
    /// serialization error.
    fn render(&self, digests: &[Digest], out: &mut dyn Write) -> io::Result<()> {
        let normalized: Vec<Digest> = digests
            .iter()
            .cloned()
            .map(|mut digest| {
                digest.weekly_top_story.url = normalize_url(&digest.weekly_top_story.url);
                for story in &mut digest.top_stories {
                    story.url = normalize_url(&story.url);
                }
                digest
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &normalized)?;
        writeln!(out)
    }
}
