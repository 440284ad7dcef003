//! HTTP client for the monthly JSON schedule feed

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::time::Duration;

use super::{month_key, ScheduleSource};
use crate::error::FeedError;
use crate::models::{DaySchedule, ScheduleDocument};

/// Base URL of the monthly calendar documents
const DEFAULT_FEED_URL: &str = "https://www.jra.go.jp/keiba/common/calendar/json";

/// Default location of the season calendar
const DEFAULT_CALENDAR_URL: &str = "data/jrarace2026.ics";

/// Feed configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL; documents live at `{base_url}/{YYYYMM}.json`
    pub base_url: String,
    /// iCalendar file path or URL for the secondary feed
    pub calendar_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_URL.to_string(),
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
            timeout_secs: 10,
            user_agent: concat!("keiba-roulette/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build a reqwest client from the feed configuration
pub(crate) fn build_client(config: &FeedConfig) -> Result<reqwest::Client, FeedError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}

/// Fetch a URL as text, bypassing any cache. Non-success status is NotFound.
pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    key: String,
) -> Result<String, FeedError> {
    let response = client
        .get(url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await?;

    if !response.status().is_success() {
        tracing::info!("{} returned {}", url, response.status());
        return Err(FeedError::NotFound { key });
    }

    Ok(response.text().await?)
}

/// Schedule source backed by the monthly JSON feed
pub struct HttpScheduleSource {
    client: reqwest::Client,
    config: FeedConfig,
}

impl HttpScheduleSource {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Build URL for a month's document
    fn build_url(&self, year: i32, month: u32) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            month_key(year, month)
        )
    }
}

#[async_trait]
impl ScheduleSource for HttpScheduleSource {
    fn name(&self) -> &str {
        "schedule feed"
    }

    async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
        let url = self.build_url(year, month);
        tracing::info!("Fetching schedule: {}", url);

        let body = fetch_text(&self.client, &url, month_key(year, month)).await?;
        parse_document(&body, year, month)
    }
}

/// Feeds publish either a full document or a bare array of days
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Document(ScheduleDocument),
    Days(Vec<DaySchedule>),
}

/// Decode a month document.
///
/// Missing `year`/`month` fields are filled from the request; a document
/// that names a different month is rejected.
pub fn parse_document(body: &str, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
    let raw: RawDocument =
        serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))?;

    let mut doc = match raw {
        RawDocument::Document(doc) => doc,
        RawDocument::Days(days) => ScheduleDocument {
            year,
            month,
            days,
        },
    };

    if doc.year == 0 {
        doc.year = year;
    }
    if doc.month == 0 {
        doc.month = month;
    }

    if doc.year != year || doc.month != month {
        return Err(FeedError::Decode(format!(
            "expected {} but document is for {}",
            month_key(year, month),
            month_key(doc.year, doc.month)
        )));
    }

    Ok(doc)
}
