//! Season calendar (iCalendar) as a secondary schedule source
//!
//! Each `VEVENT` is one race day at one venue:
//!
//! ```text
//! BEGIN:VEVENT
//! DTSTART;VALUE=DATE:20260412
//! SUMMARY:桜花賞(GI)
//! LOCATION:阪神競馬場
//! END:VEVENT
//! ```
//!
//! Events whose summary carries a grade become graded races at that day's
//! venue. Ordinary meeting days ("阪神競馬") contribute the venue only.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::client::{build_client, fetch_text};
use super::{month_key, FeedConfig, ScheduleSource};
use crate::error::FeedError;
use crate::models::{GradedRaceEntry, ScheduleDocument, VenueRaceGroup};

/// "(GI)", "（Ｇ２）", "(J・GIII)" at the end of a summary
static GRADE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[(（]\s*((?:[JＪ]\s*[·・.\-]?\s*)?[GＧ]\s*(?:III|II|I|[1-3１-３]))\s*[)）]\s*$")
        .expect("grade suffix pattern")
});

/// "阪神競馬" style meeting summaries
static MEETING_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)競馬").expect("meeting summary pattern"));

/// Where the calendar text comes from
#[derive(Debug, Clone)]
enum CalendarLocation {
    Url(String),
    Path(String),
}

/// Schedule source reading a season calendar
pub struct IcsCalendarSource {
    client: reqwest::Client,
    location: CalendarLocation,
}

impl IcsCalendarSource {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let url = config.calendar_url.clone();
        let location = if url.starts_with("http://") || url.starts_with("https://") {
            CalendarLocation::Url(url)
        } else {
            CalendarLocation::Path(url.trim_start_matches("file://").to_string())
        };

        Ok(Self {
            client: build_client(config)?,
            location,
        })
    }

    async fn load(&self, key: String) -> Result<String, FeedError> {
        match &self.location {
            CalendarLocation::Url(url) => {
                tracing::info!("Fetching calendar: {}", url);
                fetch_text(&self.client, url, key).await
            }
            CalendarLocation::Path(path) => {
                tracing::info!("Reading calendar: {}", path);
                match tokio::fs::read_to_string(path).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(FeedError::NotFound { key })
                    }
                    Err(e) => Err(FeedError::Io(e)),
                }
            }
        }
    }
}

#[async_trait]
impl ScheduleSource for IcsCalendarSource {
    fn name(&self) -> &str {
        "calendar feed"
    }

    async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
        let key = month_key(year, month);
        let text = self.load(key.clone()).await?;
        parse_ics_month(&text, year, month).ok_or(FeedError::NotFound { key })
    }
}

/// One parsed `VEVENT`
#[derive(Debug, Default)]
struct CalendarEvent {
    date: Option<String>,
    summary: Option<String>,
    location: Option<String>,
}

/// Undo RFC 5545 line folding
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_end_matches('\r');
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

fn parse_events(text: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut current: Option<CalendarEvent> = None;

    for line in unfold(text) {
        if line == "BEGIN:VEVENT" {
            current = Some(CalendarEvent::default());
            continue;
        }
        if line == "END:VEVENT" {
            if let Some(event) = current.take() {
                events.push(event);
            }
            continue;
        }

        let Some(event) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // Drop parameters: "DTSTART;VALUE=DATE" -> "DTSTART"
        let name = key.split(';').next().unwrap_or(key);
        let value = value.trim().replace("\\,", ",");

        match name {
            "DTSTART" => event.date = Some(value.chars().take(8).collect()),
            "SUMMARY" => event.summary = Some(value),
            "LOCATION" => event.location = Some(value),
            _ => {}
        }
    }

    events
}

/// Split "桜花賞(GI)" into ("桜花賞", Some("GI"))
fn split_grade(summary: &str) -> (String, Option<String>) {
    match GRADE_SUFFIX.captures(summary) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.start());
            let grade = caps[1].split_whitespace().collect::<String>();
            (summary[..whole].trim().to_string(), Some(grade))
        }
        None => (summary.trim().to_string(), None),
    }
}

fn event_venue(event: &CalendarEvent) -> Option<String> {
    if let Some(location) = &event.location {
        let venue = location.trim().trim_end_matches("競馬場").trim();
        if !venue.is_empty() {
            return Some(venue.to_string());
        }
    }
    let summary = event.summary.as_deref()?;
    MEETING_SUMMARY
        .captures(summary)
        .map(|caps| caps[1].trim().to_string())
}

/// Build a month document from calendar text.
///
/// Returns `None` when the calendar has no events in that month.
pub fn parse_ics_month(text: &str, year: i32, month: u32) -> Option<ScheduleDocument> {
    let prefix = month_key(year, month);
    let mut doc = ScheduleDocument::new(year, month);

    for event in parse_events(text) {
        let Some(date) = event.date.as_deref() else {
            continue;
        };
        if date.len() != 8 || !date.starts_with(&prefix) {
            continue;
        }
        let Ok(day) = date[6..8].parse::<u32>() else {
            continue;
        };
        let Some(venue) = event_venue(&event) else {
            continue;
        };

        let schedule = doc.day_mut(day);
        let pos = match schedule.venues.iter().position(|g| g.label == venue) {
            Some(idx) => idx + 1,
            None => {
                schedule.venues.push(VenueRaceGroup::new(venue));
                schedule.venues.len()
            }
        };

        if let Some(summary) = event.summary.as_deref() {
            if let (name, Some(grade)) = split_grade(summary) {
                schedule.graded.push(GradedRaceEntry { name, grade, pos });
            }
        }
    }

    if doc.days.is_empty() {
        return None;
    }
    doc.days.sort_by_key(|d| d.day);
    Some(doc)
}
