//! Built-in placeholder digests.
//!
//! When every network tier fails the page still needs something to show.
//! [`FallbackProvider`] is the seam: the resolver asks it for a snapshot and
//! it must always answer. [`BuiltinFallback`] carries one sample digest per
//! known category and hands out the `general` one for anything else.

use crate::models::{NewsItem, Snapshot};

/// Supplies the last-resort snapshot for a category. Must not fail.
pub trait FallbackProvider {
    fn snapshot_for(&self, category: &str) -> Snapshot;
}

/// Embedded sample digests for `healthcare` and `general`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFallback;

impl BuiltinFallback {
    pub const CATEGORIES: [&'static str; 2] = ["healthcare", "general"];
}

impl FallbackProvider for BuiltinFallback {
    fn snapshot_for(&self, category: &str) -> Snapshot {
        match category {
            "healthcare" => healthcare(),
            _ => general(),
        }
    }
}

/// Returns the same snapshot for every category.
impl FallbackProvider for Snapshot {
    fn snapshot_for(&self, _category: &str) -> Snapshot {
        self.clone()
    }
}

fn story(
    headline: &str,
    summary: &str,
    source: &str,
    importance: u8,
    impact_to_me: u8,
    category: &str,
    url: &str,
) -> NewsItem {
    NewsItem {
        headline: headline.to_string(),
        summary: summary.to_string(),
        source: source.to_string(),
        importance,
        impact_to_me,
        category: category.to_string(),
        url: url.to_string(),
    }
}

fn healthcare() -> Snapshot {
    Snapshot {
        weekly_top_story: story(
            "Revolutionary CAR-T Cell Therapy Shows 90% Remission Rate in Pediatric Leukemia",
            "A new CAR-T cell therapy targeting pediatric leukemia has demonstrated remarkable efficacy in Phase II trials, with 90% of patients achieving complete remission after six months.",
            "The Lancet",
            5,
            5,
            "Research",
            "https://www.thelancet.com/article",
        ),
        stories: vec![
            story(
                "FDA Announces New Fast-Track Program for Gene Therapies",
                "The FDA has unveiled a new expedited review pathway aimed at accelerating the approval of gene therapies for rare diseases, potentially cutting approval times by up to 50%.",
                "STAT News",
                4,
                4,
                "Policy",
                "https://www.statnews.com/fda-fast-track",
            ),
            story(
                "AI Diagnostic Tool Achieves Radiologist-Level Accuracy",
                "A new artificial intelligence system for detecting lung cancer on CT scans has matched or exceeded the diagnostic accuracy of experienced radiologists in a large clinical trial.",
                "NEJM",
                4,
                4,
                "Tech",
                "https://www.nejm.org/ai-diagnostic",
            ),
            story(
                "Telehealth Reimbursement Rules Expanded for Rural Areas",
                "CMS has expanded Medicare reimbursement for telehealth services in rural communities, removing geographic restrictions that previously limited access to virtual care.",
                "Fierce Healthcare",
                3,
                3,
                "Policy",
                "https://www.fiercehealthcare.com/telehealth",
            ),
        ],
    }
}

fn general() -> Snapshot {
    Snapshot {
        weekly_top_story: story(
            "Breakthrough in Nuclear Fusion Energy Achieved",
            "Scientists at a major research facility have achieved a net energy gain in nuclear fusion, bringing humanity one step closer to unlimited clean energy.",
            "AP News",
            5,
            5,
            "Science",
            "https://www.apnews.com/fusion-energy",
        ),
        stories: vec![
            story(
                "Quantum Supremacy Claimed by Three Major Tech Companies",
                "Google, IBM, and a leading Chinese tech firm have simultaneously announced they've achieved quantum supremacy, solving complex problems in minutes that would take traditional supercomputers millennia.",
                "The Economist",
                4,
                4,
                "Technology",
                "https://www.economist.com/quantum-supremacy",
            ),
            story(
                "Global AI Regulation Framework Agreed by G7 Nations",
                "G7 countries have reached a preliminary agreement on a unified framework for AI governance, establishing new standards for transparency and safety in artificial intelligence development.",
                "Reuters",
                4,
                3,
                "Global",
                "https://www.reuters.com/ai-regulation",
            ),
            story(
                "Renewable Energy Investments Surpass Fossil Fuels for First Time",
                "Global investment in renewable energy projects has exceeded fossil fuel investments for the first time in history, signaling a major shift in the energy sector's trajectory.",
                "BBC",
                4,
                4,
                "Business",
                "https://www.bbc.com/renewable-energy",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories_have_distinct_data() {
        let health = BuiltinFallback.snapshot_for("healthcare");
        let general = BuiltinFallback.snapshot_for("general");
        assert_eq!(health.weekly_top_story.source, "The Lancet");
        assert_eq!(general.weekly_top_story.source, "AP News");
        assert_eq!(health.stories.len(), 3);
        assert_eq!(general.stories.len(), 3);
    }

    #[test]
    fn test_unknown_category_gets_general() {
        assert_eq!(
            BuiltinFallback.snapshot_for("sports"),
            BuiltinFallback.snapshot_for("general")
        );
        assert_eq!(
            BuiltinFallback.snapshot_for(""),
            BuiltinFallback.snapshot_for("general")
        );
    }

    #[test]
    fn test_ratings_in_range() {
        for category in BuiltinFallback::CATEGORIES {
            let snap = BuiltinFallback.snapshot_for(category);
            for item in std::iter::once(&snap.weekly_top_story).chain(snap.stories.iter()) {
                assert!((1..=5).contains(&item.importance));
                assert!((1..=5).contains(&item.impact_to_me));
                assert!(item.url.starts_with("https://"));
            }
        }
    }

    #[test]
    fn test_snapshot_is_a_provider() {
        let fixed = BuiltinFallback.snapshot_for("healthcare");
        assert_eq!(fixed.snapshot_for("general"), fixed);
    }
}
