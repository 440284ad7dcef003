//! Month-keyed schedule sources
//!
//! Every source answers `fetch_month(year, month)` with a full
//! [`ScheduleDocument`] or a [`FeedError`]. Errors are expected (a month
//! that is not published yet is the common case) and only mean "try the
//! next fallback tier".
//!
//! # Example
//!
//! ```no_run
//! use keiba_roulette::feed::{FeedConfig, HttpScheduleSource, ScheduleSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = HttpScheduleSource::new(FeedConfig::default())?;
//!     let doc = source.fetch_month(2025, 4).await?;
//!     println!("{} race days", doc.days.len());
//!     Ok(())
//! }
//! ```

mod client;
mod ics;
mod memory;

pub use client::{parse_document, FeedConfig, HttpScheduleSource};
pub use ics::{parse_ics_month, IcsCalendarSource};
pub use memory::StaticScheduleSource;

use async_trait::async_trait;

use crate::error::FeedError;
use crate::models::ScheduleDocument;

/// A source of monthly schedule documents
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Short label used in log lines
    fn name(&self) -> &str;

    /// Read the document for one month. One attempt, no caching.
    async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError>;
}

/// Resource key for a month, e.g. "202504"
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}{:02}", year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_pads() {
        assert_eq!(month_key(2025, 4), "202504");
        assert_eq!(month_key(2025, 12), "202512");
    }
}
