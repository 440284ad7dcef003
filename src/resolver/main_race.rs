//! Main-race selection for a venue

use chrono::NaiveDate;
use std::cmp::Ordering;

use super::feature::FeatureRaceResolver;
use super::grade::{grade_rank, is_jump_grade};
use crate::calendar::{days_until_compact, to_compact_date, today_local};
use crate::models::{FeatureRaceInfo, ResolvedFeatureRace, WeekendCard, GENERIC_MAIN_RACE_NAME};

/// Preference order between two candidates (Less = preferred).
///
/// Pivot-day races first, then grade rank, then flat before jump, then
/// date and name.
fn compare_candidates(a: &ResolvedFeatureRace, b: &ResolvedFeatureRace, pivot: &str) -> Ordering {
    (a.date != pivot)
        .cmp(&(b.date != pivot))
        .then_with(|| grade_rank(&a.grade).cmp(&grade_rank(&b.grade)))
        .then_with(|| is_jump_grade(&a.grade).cmp(&is_jump_grade(&b.grade)))
        .then_with(|| a.date.cmp(&b.date))
        .then_with(|| a.name.cmp(&b.name))
}

/// A venue's candidates, best first
pub fn rank_candidates<'a>(
    races: &'a [ResolvedFeatureRace],
    venue: &str,
    pivot: NaiveDate,
) -> Vec<&'a ResolvedFeatureRace> {
    let pivot = to_compact_date(pivot);
    let mut candidates: Vec<&ResolvedFeatureRace> =
        races.iter().filter(|race| race.venue == venue).collect();
    candidates.sort_by(|a, b| compare_candidates(a, b, &pivot));
    candidates
}

/// Best race for a venue, or the unassigned sentinel.
///
/// `days_until` is clamped at zero; an unreadable date counts as zero.
pub fn select_main_race(
    races: &[ResolvedFeatureRace],
    venue: &str,
    pivot: NaiveDate,
    today: NaiveDate,
) -> FeatureRaceInfo {
    let candidates = rank_candidates(races, venue, pivot);
    let Some(best) = candidates.first() else {
        return FeatureRaceInfo::unassigned();
    };

    tracing::debug!(
        "Main race for {}: {} ({}) out of {} candidates",
        venue,
        best.name,
        best.grade,
        candidates.len()
    );

    FeatureRaceInfo {
        name: best.name.clone(),
        grade: best.grade.clone(),
        date: best.date.clone(),
        days_until: days_until_compact(&best.date, today).unwrap_or(0),
    }
}

/// Picks the race presented as a venue's main event
#[derive(Clone)]
pub struct MainRaceSelector {
    resolver: FeatureRaceResolver,
}

impl MainRaceSelector {
    pub fn new(resolver: FeatureRaceResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &FeatureRaceResolver {
        &self.resolver
    }

    /// Main race for `venue` on the weekend of `pivot`. Never fails.
    pub async fn main_race_for(&self, venue: &str, pivot: NaiveDate) -> FeatureRaceInfo {
        self.main_race_for_at(venue, pivot, today_local()).await
    }

    /// [`main_race_for`](Self::main_race_for) with an explicit "today"
    pub async fn main_race_for_at(
        &self,
        venue: &str,
        pivot: NaiveDate,
        today: NaiveDate,
    ) -> FeatureRaceInfo {
        match self.resolver.weekend_card(pivot).await {
            WeekendCard::DefaultRace { name } => FeatureRaceInfo::placeholder(name),
            WeekendCard::Unknown => FeatureRaceInfo::placeholder(GENERIC_MAIN_RACE_NAME),
            card => select_main_race(card.graded_races(), venue, pivot, today),
        }
    }
}
