//! Venue and feature-race resolution
//!
//! - [`VenueResolver`]: which venues run on a weekend
//! - [`FeatureRaceResolver`]: graded races of a weekend, with the fallback
//!   chain schedule feed → calendar feed → monthly table → default race
//! - [`MainRaceSelector`]: the one race shown as a venue's main event

pub mod feature;
pub mod grade;
pub mod main_race;
pub mod venue;

pub use feature::{dedup_races, graded_races_on_date, FeatureRaceResolver};
pub use grade::{grade_rank, is_jump_grade, normalize_grade, UNRANKED_GRADE};
pub use main_race::{rank_candidates, select_main_race, MainRaceSelector};
pub use venue::{extract_venue_name, venues_on_date, VenueResolver};

use chrono::{Datelike, NaiveDate};

use crate::error::FeedError;
use crate::feed::ScheduleSource;
use crate::models::ScheduleDocument;

/// Documents covering a Saturday/Sunday pair
pub(crate) enum WeekendFetch {
    /// Both days fall in the same month: one read
    Single(Result<ScheduleDocument, FeedError>),
    /// The weekend straddles a month boundary: one read per month
    Split(
        Result<ScheduleDocument, FeedError>,
        Result<ScheduleDocument, FeedError>,
    ),
}

impl WeekendFetch {
    /// Both documents, or the first failure
    pub(crate) fn into_pair(
        self,
    ) -> Result<(ScheduleDocument, Option<ScheduleDocument>), FeedError> {
        match self {
            WeekendFetch::Single(doc) => Ok((doc?, None)),
            WeekendFetch::Split(sat, sun) => Ok((sat?, Some(sun?))),
        }
    }
}

/// Read the month documents for a weekend.
///
/// Split weekends issue both reads together and wait for both.
pub(crate) async fn fetch_weekend(
    source: &dyn ScheduleSource,
    saturday: NaiveDate,
    sunday: NaiveDate,
) -> WeekendFetch {
    if (saturday.year(), saturday.month()) == (sunday.year(), sunday.month()) {
        return WeekendFetch::Single(source.fetch_month(saturday.year(), saturday.month()).await);
    }

    tracing::debug!(
        "Weekend {} / {} straddles a month boundary",
        saturday,
        sunday
    );
    let (sat, sun) = tokio::join!(
        source.fetch_month(saturday.year(), saturday.month()),
        source.fetch_month(sunday.year(), sunday.month()),
    );
    WeekendFetch::Split(sat, sun)
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::FeedError;
    use crate::feed::{ScheduleSource, StaticScheduleSource};
    use crate::models::{DaySchedule, GradedRaceEntry, ScheduleDocument, VenueRaceGroup};

    /// Wraps a source and counts reads
    pub struct CountingSource {
        pub inner: StaticScheduleSource,
        pub reads: AtomicUsize,
    }

    impl CountingSource {
        pub fn new(inner: StaticScheduleSource) -> Self {
            Self {
                inner,
                reads: AtomicUsize::new(0),
            }
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScheduleSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_month(year, month).await
        }
    }

    /// Source that always fails
    pub struct DownSource;

    #[async_trait]
    impl ScheduleSource for DownSource {
        fn name(&self) -> &str {
            "down"
        }

        async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
            Err(FeedError::not_found(year, month))
        }
    }

    pub fn day(day: u32, venues: &[&str], graded: &[(&str, &str, usize)]) -> DaySchedule {
        DaySchedule {
            day,
            venues: venues.iter().map(|v| VenueRaceGroup::new(*v)).collect(),
            graded: graded
                .iter()
                .map(|(name, grade, pos)| GradedRaceEntry {
                    name: name.to_string(),
                    grade: grade.to_string(),
                    pos: *pos,
                })
                .collect(),
        }
    }

    /// April 2025: Sat 12 / Sun 13 with 桜花賞 at 阪神
    pub fn april_2025() -> ScheduleDocument {
        ScheduleDocument {
            year: 2025,
            month: 4,
            days: vec![
                day(
                    12,
                    &["2回東京1日", "3回阪神2日"],
                    &[("桜花賞", "G1", 2), ("阪神牝馬ステークス", "G2", 2)],
                ),
                day(
                    13,
                    &["2回東京2日", "3回阪神3日", "1回福島1日"],
                    &[("中山グランドジャンプ", "J·G1", 1), ("アンタレスステークス", "G3", 2)],
                ),
            ],
        }
    }
}
