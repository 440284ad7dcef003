//! Graded races of a weekend and the fallback chain behind them

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;

use super::venue::{extract_venue_name, venues_on_date};
use super::fetch_weekend;
use crate::calendar::current_weekend;
use crate::error::FeedError;
use crate::feed::{month_key, ScheduleSource};
use crate::models::{
    FallbackTier, ResolvedFeatureRace, ScheduleDocument, VenueSet, WeekendCard,
};
use crate::tables::ScheduleTables;

/// Graded races listed on a day, with venues resolved by position.
///
/// A position outside the day's venue list yields an empty venue; the
/// race is kept.
pub fn graded_races_on_date(
    doc: &ScheduleDocument,
    day: u32,
    tables: &ScheduleTables,
) -> Vec<ResolvedFeatureRace> {
    let Some(schedule) = doc.day(day) else {
        return Vec::new();
    };
    let date = format!("{}{:02}", month_key(doc.year, doc.month), day);

    schedule
        .graded
        .iter()
        .map(|entry| {
            let venue = schedule
                .venue_at(entry.pos)
                .and_then(|group| extract_venue_name(&group.label, tables))
                .unwrap_or_default();

            ResolvedFeatureRace {
                venue,
                name: entry.name.clone(),
                grade: entry.grade.clone(),
                date: date.clone(),
            }
        })
        .collect()
}

/// Drop repeated (venue, grade, name, date) tuples, keeping first occurrence
pub fn dedup_races(races: Vec<ResolvedFeatureRace>) -> Vec<ResolvedFeatureRace> {
    let mut seen = HashSet::new();
    races
        .into_iter()
        .filter(|race| seen.insert(race.clone()))
        .collect()
}

/// Resolves a weekend's graded races through the fallback tiers
#[derive(Clone)]
pub struct FeatureRaceResolver {
    primary: Arc<dyn ScheduleSource>,
    calendar: Option<Arc<dyn ScheduleSource>>,
    tables: Arc<ScheduleTables>,
}

impl FeatureRaceResolver {
    pub fn new(primary: Arc<dyn ScheduleSource>, tables: Arc<ScheduleTables>) -> Self {
        Self {
            primary,
            calendar: None,
            tables,
        }
    }

    /// Add the secondary calendar feed tier
    pub fn with_calendar(mut self, calendar: Arc<dyn ScheduleSource>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn tables(&self) -> &ScheduleTables {
        &self.tables
    }

    /// Weekend data from the first tier that answers.
    ///
    /// Tiers, in order: schedule feed, calendar feed, monthly venue table,
    /// default race name. A feed tier answers only if every month the
    /// weekend touches could be read. Tiers are never merged.
    pub async fn weekend_card(&self, reference: NaiveDate) -> WeekendCard {
        let (saturday, sunday) = current_weekend(reference);

        let feeds = [
            (FallbackTier::ScheduleFeed, Some(&self.primary)),
            (FallbackTier::CalendarFeed, self.calendar.as_ref()),
        ];
        for (tier, source) in feeds {
            let Some(source) = source else {
                continue;
            };
            match self.from_source(source.as_ref(), saturday, sunday).await {
                Ok((venues, races)) => {
                    tracing::info!(
                        "Weekend {}: {} venues, {} graded races from {}",
                        saturday,
                        venues.len(),
                        races.len(),
                        source.name()
                    );
                    return WeekendCard::Feed {
                        source: tier,
                        venues,
                        races,
                    };
                }
                Err(e) => {
                    tracing::warn!("{} unavailable for weekend {}: {}", source.name(), saturday, e);
                }
            }
        }

        let month = saturday.month();
        if let Some(venues) = self.tables.monthly_venues.get(&month) {
            tracing::info!("Weekend {}: using monthly venue table", saturday);
            return WeekendCard::MonthlyVenues {
                venues: venues.iter().cloned().collect(),
            };
        }

        if let Some(name) = self.tables.default_race_name(month) {
            tracing::info!("Weekend {}: using default race {}", saturday, name);
            return WeekendCard::DefaultRace {
                name: name.to_string(),
            };
        }

        tracing::warn!("Weekend {}: no data from any tier", saturday);
        WeekendCard::Unknown
    }

    /// Venues to offer for the weekend containing `reference`.
    ///
    /// Taken from the tier that answers [`weekend_card`](Self::weekend_card),
    /// keeping only venues the tables know. When that leaves nothing, the
    /// month's table venues are used and the tier is `MonthlyTable`.
    pub async fn weekend_venues(&self, reference: NaiveDate) -> (VenueSet, FallbackTier) {
        let card = self.weekend_card(reference).await;
        let venues: VenueSet = card
            .venues()
            .into_iter()
            .filter(|venue| {
                let known = self.tables.is_known_venue(venue);
                if !known {
                    tracing::debug!("Skipping unknown venue {}", venue);
                }
                known
            })
            .collect();

        match card.tier() {
            Some(tier) if !venues.is_empty() => (venues, tier),
            _ => {
                let (saturday, _) = current_weekend(reference);
                let venues: VenueSet =
                    self.tables.venues_for_month(saturday.month()).into_iter().collect();
                (venues, FallbackTier::MonthlyTable)
            }
        }
    }

    /// Graded races of the weekend containing `reference`, deduplicated.
    ///
    /// Empty when the weekend resolved through a table tier.
    pub async fn weekend_graded_races(&self, reference: NaiveDate) -> Vec<ResolvedFeatureRace> {
        self.weekend_card(reference).await.graded_races().to_vec()
    }

    async fn from_source(
        &self,
        source: &dyn ScheduleSource,
        saturday: NaiveDate,
        sunday: NaiveDate,
    ) -> Result<(VenueSet, Vec<ResolvedFeatureRace>), FeedError> {
        let (sat_doc, sun_doc) = fetch_weekend(source, saturday, sunday).await.into_pair()?;
        let sun_doc = sun_doc.as_ref().unwrap_or(&sat_doc);

        let venues = venues_on_date(&sat_doc, saturday.day(), &self.tables)
            .union(venues_on_date(sun_doc, sunday.day(), &self.tables));

        let mut races = graded_races_on_date(&sat_doc, saturday.day(), &self.tables);
        races.extend(graded_races_on_date(sun_doc, sunday.day(), &self.tables));

        Ok((venues, dedup_races(races)))
    }
}
