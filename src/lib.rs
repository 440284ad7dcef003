//! Keiba Roulette - weekend JRA venue and feature-race resolution
//!
//! This library provides:
//! - Weekend and pivot-day arithmetic in JST
//! - Month-keyed schedule feeds (JSON feed, season calendar, in-memory)
//! - Venue resolution and graded-race resolution with tiered fallbacks
//! - Main-race selection per venue
//! - Race card, field-size bounds and the winning-number draw
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use keiba_roulette::calendar::{now_local, pivot_date};
//! use keiba_roulette::feed::{FeedConfig, HttpScheduleSource};
//! use keiba_roulette::resolver::{FeatureRaceResolver, MainRaceSelector};
//! use keiba_roulette::tables::ScheduleTables;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = Arc::new(HttpScheduleSource::new(FeedConfig::default())?);
//!     let resolver = FeatureRaceResolver::new(source, Arc::new(ScheduleTables::default()));
//!     let selector = MainRaceSelector::new(resolver);
//!
//!     let main = selector.main_race_for("阪神", pivot_date(now_local())).await;
//!     println!("{} {}", main.name, main.grade);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod draw;
pub mod error;
pub mod feed;
pub mod models;
pub mod resolver;
pub mod tables;

// Re-export commonly used types
pub use error::{FeedError, ScheduleError};
pub use models::{
    DaySchedule, FallbackTier, FeatureRaceInfo, GradedRaceEntry, ResolvedFeatureRace,
    ScheduleDocument, VenueRaceGroup, VenueSet, WeekendCard,
};
pub use resolver::{FeatureRaceResolver, MainRaceSelector, VenueResolver};
pub use tables::ScheduleTables;
