//! Active venues from schedule documents

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use super::{fetch_weekend, WeekendFetch};
use crate::calendar::current_weekend;
use crate::feed::ScheduleSource;
use crate::models::{ScheduleDocument, VenueSet};
use crate::tables::ScheduleTables;

/// Tokens preceding the venue in a session label ("2回東京1日")
const LEADING_TOKENS: [&str; 2] = ["第", "回"];

/// Tokens following the venue, outermost first
const TRAILING_TOKENS: [&str; 5] = ["日目", "日", "第", "競馬場", "競馬"];

fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c)
}

/// Bare venue name from a session label.
///
/// Drops every ASCII or full-width digit, then the session and day tokens
/// around the name, then maps known aliases. `None` if nothing is left.
pub fn extract_venue_name(label: &str, tables: &ScheduleTables) -> Option<String> {
    let without_digits: String = label.chars().filter(|c| !is_digit(*c)).collect();

    let mut name = without_digits.trim();
    for token in LEADING_TOKENS {
        name = name.strip_prefix(token).unwrap_or(name).trim_start();
    }
    for token in TRAILING_TOKENS {
        name = name.strip_suffix(token).unwrap_or(name).trim_end();
    }

    if name.is_empty() {
        return None;
    }
    Some(tables.canonical_venue(name).to_string())
}

/// Venues running on a day of the document's month.
///
/// A day missing from the document is an empty set.
pub fn venues_on_date(doc: &ScheduleDocument, day: u32, tables: &ScheduleTables) -> VenueSet {
    let Some(schedule) = doc.day(day) else {
        return VenueSet::new();
    };

    schedule
        .venues
        .iter()
        .filter_map(|group| extract_venue_name(&group.label, tables))
        .collect()
}

/// Looks up which venues run on a weekend
#[derive(Clone)]
pub struct VenueResolver {
    source: Arc<dyn ScheduleSource>,
    tables: Arc<ScheduleTables>,
}

impl VenueResolver {
    pub fn new(source: Arc<dyn ScheduleSource>, tables: Arc<ScheduleTables>) -> Self {
        Self { source, tables }
    }

    /// Union of Saturday's and Sunday's venues.
    ///
    /// Reads each month once; a month that cannot be read contributes
    /// nothing.
    pub async fn venues_for_weekend(&self, saturday: NaiveDate, sunday: NaiveDate) -> VenueSet {
        match fetch_weekend(self.source.as_ref(), saturday, sunday).await {
            WeekendFetch::Single(Ok(doc)) => {
                venues_on_date(&doc, saturday.day(), &self.tables)
                    .union(venues_on_date(&doc, sunday.day(), &self.tables))
            }
            WeekendFetch::Single(Err(e)) => {
                tracing::warn!("No schedule for weekend of {}: {}", saturday, e);
                VenueSet::new()
            }
            WeekendFetch::Split(sat, sun) => {
                let mut venues = VenueSet::new();
                for (date, doc) in [(saturday, sat), (sunday, sun)] {
                    match doc {
                        Ok(doc) => venues.extend(venues_on_date(&doc, date.day(), &self.tables)),
                        Err(e) => tracing::warn!("No schedule for {}: {}", date, e),
                    }
                }
                venues
            }
        }
    }

    /// Venues of the weekend containing `reference`
    pub async fn venues_for_reference(&self, reference: NaiveDate) -> VenueSet {
        let (saturday, sunday) = current_weekend(reference);
        self.venues_for_weekend(saturday, sunday).await
    }

    /// Typical venues for a month from the static table
    pub fn monthly_venues(&self, month: u32) -> VenueSet {
        self.tables.venues_for_month(month).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StaticScheduleSource;
    use crate::resolver::test_support::{april_2025, day, CountingSource, DownSource};

    fn tables() -> ScheduleTables {
        ScheduleTables::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_venue_name() {
        let t = tables();
        assert_eq!(extract_venue_name("2回東京1日", &t).as_deref(), Some("東京"));
        assert_eq!(extract_venue_name("３回阪神２日", &t).as_deref(), Some("阪神"));
        assert_eq!(extract_venue_name("第1回小倉10日目", &t).as_deref(), Some("小倉"));
        assert_eq!(extract_venue_name("中山競馬場", &t).as_deref(), Some("中山"));
        assert_eq!(extract_venue_name(" 1回 福島 1日 ", &t).as_deref(), Some("福島"));
    }

    #[test]
    fn test_extract_venue_name_ordinal_day() {
        let t = tables();
        assert_eq!(extract_venue_name("第2回東京第1日", &t).as_deref(), Some("東京"));
        assert_eq!(extract_venue_name("第３回京都第８日目", &t).as_deref(), Some("京都"));
    }

    #[test]
    fn test_extract_venue_alias() {
        assert_eq!(extract_venue_name("府中", &tables()).as_deref(), Some("東京"));
    }

    #[test]
    fn test_extract_venue_empty() {
        let t = tables();
        assert_eq!(extract_venue_name("", &t), None);
        assert_eq!(extract_venue_name("2回1日", &t), None);
        assert_eq!(extract_venue_name("１２３", &t), None);
    }

    #[test]
    fn test_venues_on_date() {
        let doc = april_2025();
        let venues = venues_on_date(&doc, 12, &tables());
        assert_eq!(venues.into_vec(), vec!["東京", "阪神"]);
    }

    #[test]
    fn test_venues_on_missing_day() {
        assert!(venues_on_date(&april_2025(), 20, &tables()).is_empty());
    }

    #[test]
    fn test_venues_on_date_discards_empty_labels() {
        let mut doc = ScheduleDocument::new(2025, 4);
        doc.days.push(day(5, &["1回", "2回中山3日", "2回中山3日"], &[]));
        assert_eq!(venues_on_date(&doc, 5, &tables()).into_vec(), vec!["中山"]);
    }

    #[tokio::test]
    async fn test_weekend_single_fetch() {
        let source = Arc::new(CountingSource::new(StaticScheduleSource::from_documents(
            "test",
            [april_2025()],
        )));
        let resolver = VenueResolver::new(source.clone(), Arc::new(tables()));

        let venues = resolver
            .venues_for_weekend(date(2025, 4, 12), date(2025, 4, 13))
            .await;

        assert_eq!(venues.into_vec(), vec!["東京", "阪神", "福島"]);
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test]
    async fn test_weekend_straddling_months_fetches_both() {
        let mut may = ScheduleDocument::new(2025, 5);
        may.days.push(day(31, &["3回京都11日", "2回東京11日"], &[]));
        let mut june = ScheduleDocument::new(2025, 6);
        june.days.push(day(1, &["2回東京12日", "1回函館1日"], &[]));

        let source = Arc::new(CountingSource::new(StaticScheduleSource::from_documents(
            "test",
            [may, june],
        )));
        let resolver = VenueResolver::new(source.clone(), Arc::new(tables()));

        let venues = resolver.venues_for_reference(date(2025, 5, 28)).await;

        assert_eq!(venues.into_vec(), vec!["京都", "東京", "函館"]);
        assert_eq!(source.reads(), 2);
    }

    #[tokio::test]
    async fn test_weekend_straddling_with_one_month_missing() {
        let mut may = ScheduleDocument::new(2025, 5);
        may.days.push(day(31, &["3回京都11日"], &[]));
        let source = Arc::new(StaticScheduleSource::from_documents("test", [may]));
        let resolver = VenueResolver::new(source, Arc::new(tables()));

        let venues = resolver
            .venues_for_weekend(date(2025, 5, 31), date(2025, 6, 1))
            .await;
        assert_eq!(venues.into_vec(), vec!["京都"]);
    }

    #[tokio::test]
    async fn test_weekend_source_down() {
        let resolver = VenueResolver::new(Arc::new(DownSource), Arc::new(tables()));
        let venues = resolver
            .venues_for_weekend(date(2025, 4, 12), date(2025, 4, 13))
            .await;
        assert!(venues.is_empty());
    }

    #[test]
    fn test_monthly_venues() {
        let resolver = VenueResolver::new(Arc::new(DownSource), Arc::new(tables()));
        assert_eq!(resolver.monthly_venues(7).into_vec(), vec!["函館", "福島", "小倉"]);
    }
}
