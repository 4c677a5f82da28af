//! Plain-text digest page.
//!
//! ```text
//! == Healthcare ==
//!
//! Weekly top story  [Research]
//!   Revolutionary CAR-T Cell Therapy Shows 90% Remission Rate ...
//!   A new CAR-T cell therapy targeting pediatric leukemia ...
//!   The Lancet | importance ★★★★★ | impact ■■■■■
//!   https://www.thelancet.com/article
//!
//! Top stories
//!   1. [Policy] FDA Announces New Fast-Track Program for Gene Therapies
//!      ...
//!
//! via manifest_window (fresh, captured 2025-08-27)
//! ```

use std::io::{self, Write};

use super::{Renderer, display_rating};
use crate::models::{Digest, NewsItem};
use crate::resolver::Freshness;
use crate::url_norm::normalize_url;
use crate::utils::upcase;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

fn bar(rating: u8, on: char, off: char) -> String {
    let filled = display_rating(rating) as usize;
    std::iter::repeat_n(on, filled)
        .chain(std::iter::repeat_n(off, 5 - filled))
        .collect()
}

pub fn stars(rating: u8) -> String {
    bar(rating, '★', '☆')
}

pub fn impact_bar(rating: u8) -> String {
    bar(rating, '■', '□')
}

fn write_item(out: &mut dyn Write, item: &NewsItem, indent: &str) -> io::Result<()> {
    writeln!(out, "{indent}{}", item.summary)?;
    writeln!(
        out,
        "{indent}{} | importance {} | impact {}",
        item.source,
        stars(item.importance),
        impact_bar(item.impact_to_me)
    )?;
    writeln!(out, "{indent}{}", normalize_url(&item.url))
}

fn provenance(digest: &Digest) -> String {
    let freshness = match digest.freshness {
        Freshness::Fresh => "fresh",
        Freshness::Stale => "stale",
        Freshness::Placeholder => "placeholder data",
    };
    match digest.captured_on {
        Some(date) => format!("via {} ({freshness}, captured {date})", digest.tier),
        None => format!("via {} ({freshness})", digest.tier),
    }
}

impl Renderer for TextRenderer {
    fn render(&self, digests: &[Digest], out: &mut dyn Write) -> io::Result<()> {
        for (i, digest) in digests.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "== {} ==", upcase(&digest.category))?;
            writeln!(out)?;

            let weekly = &digest.weekly_top_story;
            // Placeholders are undated; the provenance line already says so.
            let marker = if digest.weekly_story_current || digest.freshness == Freshness::Placeholder {
                ""
            } else {
                " (older than a week)"
            };
            writeln!(out, "Weekly top story{marker}  [{}]", weekly.category)?;
            writeln!(out, "  {}", weekly.headline)?;
            write_item(out, weekly, "  ")?;
            writeln!(out)?;

            writeln!(out, "Top stories")?;
            if digest.top_stories.is_empty() {
                writeln!(out, "  (no stories today)")?;
            }
            for (rank, story) in digest.top_stories.iter().enumerate() {
                writeln!(out, "  {}. [{}] {}", rank + 1, story.category, story.headline)?;
                write_item(out, story, "     ")?;
            }
            writeln!(out)?;
            writeln!(out, "{}", provenance(digest))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{BuiltinFallback, FallbackProvider};
    use crate::resolver::Tier;
    use chrono::NaiveDate;

    fn digest(freshness: Freshness, tier: Tier) -> Digest {
        let snap = BuiltinFallback.snapshot_for("healthcare");
        Digest {
            category: "healthcare".to_string(),
            weekly_top_story: snap.weekly_top_story.clone(),
            top_stories: snap.top_stories(3).into_iter().cloned().collect(),
            tier,
            freshness,
            captured_on: NaiveDate::from_ymd_opt(2025, 8, 27),
            weekly_story_current: true,
        }
    }

    #[test]
    fn test_bars_clamp() {
        assert_eq!(stars(5), "★★★★★");
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(0), "★☆☆☆☆");
        assert_eq!(impact_bar(7), "■■■■■");
    }

    #[test]
    fn test_render_text_page() {
        let mut buf = Vec::new();
        TextRenderer
            .render(&[digest(Freshness::Fresh, Tier::ManifestWindow)], &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("== Healthcare =="));
        assert!(text.contains("Weekly top story  [Research]"));
        assert!(text.contains("  1. [Policy] FDA Announces New Fast-Track Program for Gene Therapies"));
        assert!(text.contains("via manifest_window (fresh, captured 2025-08-27)"));
        assert!(!text.contains("  4. "));
    }

    #[test]
    fn test_render_placeholder_provenance() {
        let mut d = digest(Freshness::Placeholder, Tier::Fallback);
        d.captured_on = None;
        d.weekly_story_current = false;
        let mut buf = Vec::new();
        TextRenderer.render(&[d], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("via fallback (placeholder data)"));
        assert!(text.contains("Weekly top story  [Research]"));
        assert!(!text.contains("(older than a week)"));
    }

    #[test]
    fn test_render_old_weekly_story_is_marked() {
        let mut d = digest(Freshness::Stale, Tier::ManifestLatest);
        d.captured_on = NaiveDate::from_ymd_opt(2025, 8, 1);
        d.weekly_story_current = false;
        let mut buf = Vec::new();
        TextRenderer.render(&[d], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Weekly top story (older than a week)  [Research]"));
        assert!(text.contains("via manifest_latest (stale, captured 2025-08-01)"));
    }
}
