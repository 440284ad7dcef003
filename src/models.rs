use serde::{Deserialize, Serialize};

/// Race name returned when a venue has no graded race this weekend
pub const UNASSIGNED_RACE_NAME: &str = "(unassigned)";

/// Generic placeholder when every fallback tier came up empty
pub const GENERIC_MAIN_RACE_NAME: &str = "メインレース";

/// One month of published schedule data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub days: Vec<DaySchedule>,
}

impl ScheduleDocument {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            days: Vec::new(),
        }
    }

    /// Find the schedule for a day of the month
    pub fn day(&self, day: u32) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day == day)
    }

    /// Mutable access to a day, inserting an empty one if missing
    pub fn day_mut(&mut self, day: u32) -> &mut DaySchedule {
        if let Some(idx) = self.days.iter().position(|d| d.day == day) {
            &mut self.days[idx]
        } else {
            self.days.push(DaySchedule::new(day));
            let last = self.days.len() - 1;
            &mut self.days[last]
        }
    }
}

/// Races held on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: u32,
    /// Ordinary race groups, one per venue session, in feed order
    #[serde(default)]
    pub venues: Vec<VenueRaceGroup>,
    #[serde(default)]
    pub graded: Vec<GradedRaceEntry>,
}

impl DaySchedule {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            venues: Vec::new(),
            graded: Vec::new(),
        }
    }

    /// Resolve a 1-based venue position against this day's groups
    pub fn venue_at(&self, pos: usize) -> Option<&VenueRaceGroup> {
        pos.checked_sub(1).and_then(|idx| self.venues.get(idx))
    }
}

/// Session label for one venue, e.g. "2回東京1日"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVenueGroup")]
pub struct VenueRaceGroup {
    pub label: String,
}

impl VenueRaceGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Feeds publish venue groups either as bare labels or as objects
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVenueGroup {
    Label(String),
    Object {
        #[serde(alias = "name")]
        label: String,
    },
}

impl From<RawVenueGroup> for VenueRaceGroup {
    fn from(raw: RawVenueGroup) -> Self {
        match raw {
            RawVenueGroup::Label(label) | RawVenueGroup::Object { label } => Self { label },
        }
    }
}

/// Graded race as listed in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedRaceEntry {
    pub name: String,
    pub grade: String,
    /// 1-based index into the same day's venue groups
    pub pos: usize,
}

/// Graded race with its venue resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedFeatureRace {
    pub venue: String,
    pub name: String,
    pub grade: String,
    /// Compact YYYYMMDD
    pub date: String,
}

/// Result of a main-race query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRaceInfo {
    pub name: String,
    pub grade: String,
    pub date: String,
    pub days_until: i64,
}

impl FeatureRaceInfo {
    pub fn unassigned() -> Self {
        Self::placeholder(UNASSIGNED_RACE_NAME)
    }

    /// Name-only result with no date attached
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grade: String::new(),
            date: String::new(),
            days_until: 0,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.name == UNASSIGNED_RACE_NAME
    }
}

/// Venue names in first-seen order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueSet(Vec<String>);

impl VenueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a venue; returns false if it was already present
    pub fn insert(&mut self, venue: impl Into<String>) -> bool {
        let venue = venue.into();
        if self.0.contains(&venue) {
            return false;
        }
        self.0.push(venue);
        true
    }

    pub fn contains(&self, venue: &str) -> bool {
        self.0.iter().any(|v| v == venue)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn union(mut self, other: VenueSet) -> Self {
        self.extend(other);
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Extend<String> for VenueSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for venue in iter {
            self.insert(venue);
        }
    }
}

impl FromIterator<String> for VenueSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = VenueSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for VenueSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VenueSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Which fallback tier answered a weekend query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
    ScheduleFeed,
    CalendarFeed,
    MonthlyTable,
    DefaultRace,
}

/// Weekend data from the first fallback tier that produced anything
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum WeekendCard {
    /// Data from a live feed (schedule or calendar)
    Feed {
        source: FallbackTier,
        venues: VenueSet,
        races: Vec<ResolvedFeatureRace>,
    },
    /// Typical venues for the month, no race names
    MonthlyVenues { venues: VenueSet },
    /// Hardcoded race name for the month
    DefaultRace { name: String },
    /// Nothing at all is known
    Unknown,
}

impl WeekendCard {
    pub fn tier(&self) -> Option<FallbackTier> {
        match self {
            WeekendCard::Feed { source, .. } => Some(*source),
            WeekendCard::MonthlyVenues { .. } => Some(FallbackTier::MonthlyTable),
            WeekendCard::DefaultRace { .. } => Some(FallbackTier::DefaultRace),
            WeekendCard::Unknown => None,
        }
    }

    pub fn graded_races(&self) -> &[ResolvedFeatureRace] {
        match self {
            WeekendCard::Feed { races, .. } => races,
            _ => &[],
        }
    }

    pub fn venues(&self) -> VenueSet {
        match self {
            WeekendCard::Feed { venues, .. } | WeekendCard::MonthlyVenues { venues } => {
                venues.clone()
            }
            _ => VenueSet::new(),
        }
    }
}
