//! The snapshot resolver.
//!
//! [`Resolver::resolve`] walks an ordered chain of tiers and returns the
//! first usable snapshot:
//!
//! 1. [`Tier::Live`] (live mode only): the live endpoint
//! 2. [`Tier::ManifestWindow`]: newest manifest entry inside the Daily window
//! 3. [`Tier::DirectProbe`]: guessed filenames for the last three local days
//! 4. [`Tier::ManifestLatest`]: first manifest entry, no window
//! 5. [`Tier::Fallback`]: the embedded placeholder digest
//!
//! Each fetching tier reports a [`TierOutcome`]. Failures never leave this
//! module; they are traced and the chain moves on. Every chain ends with
//! [`Tier::Fallback`], which cannot fail, so `resolve` always returns a
//! [`Resolution`].

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::error::ResolveError;
use crate::fallback::{BuiltinFallback, FallbackProvider};
use crate::manifest::{UnfilteredOrder, most_recent_entry, select_candidates};
use crate::models::Snapshot;
use crate::sources::SnapshotSource;
use crate::window::{
    Clock, SystemClock, WindowKind, filename_date, is_valid_category, qualifies, snapshot_filename,
};

/// Where snapshots should come from. Chosen by the deployment, not the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Try the live endpoint first, then the static tiers.
    Live,
    /// Static tiers only.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Live,
    ManifestWindow,
    DirectProbe,
    ManifestLatest,
    Fallback,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Live => "live",
            Tier::ManifestWindow => "manifest_window",
            Tier::DirectProbe => "direct_probe",
            Tier::ManifestLatest => "manifest_latest",
            Tier::Fallback => "fallback",
        }
    }

    fn chain(mode: SourceMode) -> &'static [Tier] {
        match mode {
            SourceMode::Live => &[
                Tier::Live,
                Tier::ManifestWindow,
                Tier::DirectProbe,
                Tier::ManifestLatest,
                Tier::Fallback,
            ],
            SourceMode::Static => &[
                Tier::ManifestWindow,
                Tier::DirectProbe,
                Tier::ManifestLatest,
                Tier::Fallback,
            ],
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Live data, or a file dated inside the Daily window.
    Fresh,
    /// A real snapshot, but older than the Daily window (or of unknown date).
    Stale,
    /// The embedded fallback digest.
    Placeholder,
}

/// Result of a single fetching tier.
#[derive(Debug)]
pub enum TierOutcome {
    Fresh {
        snapshot: Snapshot,
        captured_on: Option<NaiveDate>,
    },
    Stale {
        snapshot: Snapshot,
        captured_on: Option<NaiveDate>,
    },
    /// Nothing usable. `None` means the tier had nothing to try (e.g. no
    /// manifest entries in the window); `Some` carries the last failure.
    Absent(Option<ResolveError>),
}

/// What to do with a [`TierOutcome::Stale`] result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// A stale snapshot ends the chain, like a fresh one.
    #[default]
    Accept,
    /// Drop it and keep going; the chain may end at the fallback.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub unfiltered_order: UnfilteredOrder,
    pub stale_policy: StalePolicy,
    /// Upper bound for the network tiers. On expiry the fallback is returned.
    pub timeout: Option<Duration>,
    /// How many local days the direct probe guesses, starting with today.
    pub probe_days: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            unfiltered_order: UnfilteredOrder::TrustManifest,
            stale_policy: StalePolicy::Accept,
            timeout: Some(Duration::from_secs(10)),
            probe_days: 3,
        }
    }
}

/// A resolved snapshot and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub category: String,
    pub snapshot: Snapshot,
    pub tier: Tier,
    pub freshness: Freshness,
    /// Date from the snapshot filename, when the tier fetched a named file.
    pub captured_on: Option<NaiveDate>,
}

impl Resolution {
    /// Whether the weekly highlight is still inside the Weekly window.
    ///
    /// Live snapshots carry no date and count as current; placeholders never do.
    pub fn weekly_story_current(&self, today_utc: NaiveDate) -> bool {
        match (self.freshness, self.captured_on) {
            (Freshness::Placeholder, _) => false,
            (_, Some(date)) => qualifies(date, WindowKind::Weekly, today_utc),
            (_, None) => self.tier == Tier::Live,
        }
    }
}

pub struct Resolver<S, F = BuiltinFallback, C = SystemClock> {
    source: S,
    fallback: F,
    clock: C,
    config: ResolverConfig,
}

impl<S: SnapshotSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            fallback: BuiltinFallback,
            clock: SystemClock,
            config: ResolverConfig::default(),
        }
    }
}

impl<S, F, C> Resolver<S, F, C>
where
    S: SnapshotSource,
    F: FallbackProvider,
    C: Clock,
{
    pub fn with_fallback<F2: FallbackProvider>(self, fallback: F2) -> Resolver<S, F2, C> {
        Resolver {
            source: self.source,
            fallback,
            clock: self.clock,
            config: self.config,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Resolver<S, F, C2> {
        Resolver {
            source: self.source,
            fallback: self.fallback,
            clock,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Resolve `category`. Never fails.
    pub async fn resolve(&self, category: &str, mode: SourceMode) -> Resolution {
        self.resolve_until(category, mode, std::future::pending::<()>())
            .await
    }

    /// Resolve `category`, giving up on the network tiers as soon as
    /// `cancel` completes and returning the fallback instead.
    #[instrument(level = "info", skip_all, fields(%category, ?mode))]
    pub async fn resolve_until<X>(&self, category: &str, mode: SourceMode, cancel: X) -> Resolution
    where
        X: Future<Output = ()>,
    {
        if !is_valid_category(category) {
            warn!(%category, "Category is not usable in file or endpoint names; skipping to fallback");
            return self.fallback_resolution(category);
        }

        let chain = self.run_chain(category, mode);
        let bounded = async {
            match self.config.timeout {
                Some(limit) => match tokio::time::timeout(limit, chain).await {
                    Ok(resolved) => Some(resolved),
                    Err(_) => {
                        warn!(%category, ?limit, "Resolution timed out; aborting network tiers");
                        None
                    }
                },
                None => Some(chain.await),
            }
        };

        let resolved = tokio::select! {
            resolved = bounded => resolved,
            _ = cancel => {
                warn!(%category, "Resolution cancelled; aborting network tiers");
                None
            }
        };

        resolved.unwrap_or_else(|| self.fallback_resolution(category))
    }

    /// Resolve several categories concurrently.
    ///
    /// Results come back in input order. Each resolution is independent.
    pub async fn resolve_many<I, T>(&self, categories: I, mode: SourceMode) -> Vec<Resolution>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let pending = categories
            .into_iter()
            .map(move |category| async move { self.resolve(category.as_ref(), mode).await });
        futures::future::join_all(pending).await
    }

    async fn run_chain(&self, category: &str, mode: SourceMode) -> Resolution {
        let today = self.clock.today_utc();

        for &tier in Tier::chain(mode) {
            let t0 = Instant::now();
            let outcome = match tier {
                Tier::Live => self.try_live(category).await,
                Tier::ManifestWindow => self.try_manifest_window(category, today).await,
                Tier::DirectProbe => self.try_direct_probe(category, today).await,
                Tier::ManifestLatest => self.try_manifest_latest(category, today).await,
                Tier::Fallback => return self.fallback_resolution(category),
            };
            let elapsed_ms = t0.elapsed().as_millis() as u64;

            let (snapshot, captured_on, freshness) = match outcome {
                TierOutcome::Fresh {
                    snapshot,
                    captured_on,
                } => (snapshot, captured_on, Freshness::Fresh),
                TierOutcome::Stale {
                    snapshot,
                    captured_on,
                } if self.config.stale_policy == StalePolicy::Accept => {
                    (snapshot, captured_on, Freshness::Stale)
                }
                TierOutcome::Stale { captured_on, .. } => {
                    info!(
                        %tier,
                        %category,
                        outcome = "stale_skipped",
                        ?captured_on,
                        elapsed_ms,
                        "Tier transition"
                    );
                    continue;
                }
                TierOutcome::Absent(None) => {
                    info!(%tier, %category, outcome = "absent", elapsed_ms, "Tier transition");
                    continue;
                }
                TierOutcome::Absent(Some(e)) => {
                    warn!(
                        %tier,
                        %category,
                        outcome = "failed",
                        error_kind = %e.kind(),
                        error = %e,
                        elapsed_ms,
                        "Tier transition"
                    );
                    continue;
                }
            };

            let outcome = match freshness {
                Freshness::Fresh => "fresh",
                _ => "stale",
            };
            info!(
                %tier,
                %category,
                outcome,
                ?captured_on,
                stories = snapshot.stories.len(),
                elapsed_ms,
                "Tier transition"
            );
            return Resolution {
                category: category.to_string(),
                snapshot,
                tier,
                freshness,
                captured_on,
            };
        }

        self.fallback_resolution(category)
    }

    async fn try_live(&self, category: &str) -> TierOutcome {
        match self.source.fetch_live(category).await {
            Ok(snapshot) => TierOutcome::Fresh {
                snapshot,
                captured_on: None,
            },
            Err(e) => TierOutcome::Absent(Some(e)),
        }
    }

    async fn try_manifest_window(&self, category: &str, today: NaiveDate) -> TierOutcome {
        let manifest = match self.source.fetch_manifest().await {
            Ok(m) => m,
            Err(e) => return TierOutcome::Absent(Some(e)),
        };
        let candidates = select_candidates(&manifest, category, today);
        let Some(newest) = candidates.first() else {
            return TierOutcome::Absent(None);
        };
        self.fetch_named(newest, today).await
    }

    /// Guess filenames from the local date, newest first. No window applies.
    async fn try_direct_probe(&self, category: &str, today: NaiveDate) -> TierOutcome {
        let local_today = self.clock.today_local();
        let mut last_err = None;
        for offset in 0..self.config.probe_days {
            let Some(date) = local_today.checked_sub_days(Days::new(offset)) else {
                break;
            };
            let name = snapshot_filename(date, category);
            match self.fetch_named(&name, today).await {
                TierOutcome::Absent(e) => last_err = e,
                found => return found,
            }
        }
        TierOutcome::Absent(last_err)
    }

    async fn try_manifest_latest(&self, category: &str, today: NaiveDate) -> TierOutcome {
        let manifest = match self.source.fetch_manifest().await {
            Ok(m) => m,
            Err(e) => return TierOutcome::Absent(Some(e)),
        };
        match most_recent_entry(&manifest, category, self.config.unfiltered_order) {
            Some(name) => self.fetch_named(&name, today).await,
            None => TierOutcome::Absent(None),
        }
    }

    /// Fetch a dated snapshot file; Fresh if its name is inside the Daily window.
    async fn fetch_named(&self, filename: &str, today: NaiveDate) -> TierOutcome {
        match self.source.fetch_snapshot(filename).await {
            Ok(snapshot) => {
                let captured_on = filename_date(filename);
                match captured_on {
                    Some(date) if qualifies(date, WindowKind::Daily, today) => TierOutcome::Fresh {
                        snapshot,
                        captured_on,
                    },
                    _ => TierOutcome::Stale {
                        snapshot,
                        captured_on,
                    },
                }
            }
            Err(e) => TierOutcome::Absent(Some(e)),
        }
    }

    fn fallback_resolution(&self, category: &str) -> Resolution {
        let snapshot = self.fallback.snapshot_for(category);
        info!(
            tier = %Tier::Fallback,
            %category,
            outcome = "placeholder",
            stories = snapshot.stories.len(),
            "Tier transition"
        );
        Resolution {
            category: category.to_string(),
            snapshot,
            tier: Tier::Fallback,
            freshness: Freshness::Placeholder,
            captured_on: None,
        }
    }
}
