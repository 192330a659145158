//! Time periods used as session keys
//!
//! A period is a start instant plus a frequency (a count of calendar units).
//! The start is floored to the frequency unit, so `"2021-09-15 10:42;H"` denotes
//! the hour starting at 10:00. Periods are compared three-way: two periods are
//! ordered only when they share no instant, otherwise they overlap.
//!
//! Text form: `"<anchor>[;<frequency>]"`, frequency defaulting to one day.
//! - Anchor: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS[.fff]` (a `T`
//!   separator is accepted as well)
//! - Frequency: optional count followed by `D`, `H`, `min`/`T`, `s`/`S`, `ms`/`L`
//!
//! # Examples
//!
//! ```
//! use pollscore_common::period::{Period, PeriodOrdering};
//!
//! let lecture: Period = "2021-09-15 10:30; 90min".parse().unwrap();
//! let next_day: Period = "2021-09-16".parse().unwrap();
//!
//! assert_eq!(lecture.to_string(), "2021-09-15 10:30; 90min");
//! assert_eq!(lecture.compare(&next_day), PeriodOrdering::Before);
//! ```

use crate::{Error, Result};
use chrono::{DurationRound, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Accepted anchor layouts with a time component
const ANCHOR_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Calendar unit of a period frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl FrequencyUnit {
    /// Coarsest first
    const ALL: [FrequencyUnit; 5] = [
        FrequencyUnit::Day,
        FrequencyUnit::Hour,
        FrequencyUnit::Minute,
        FrequencyUnit::Second,
        FrequencyUnit::Millisecond,
    ];

    /// Length of one unit in milliseconds
    pub fn millis(self) -> i64 {
        match self {
            FrequencyUnit::Day => 86_400_000,
            FrequencyUnit::Hour => 3_600_000,
            FrequencyUnit::Minute => 60_000,
            FrequencyUnit::Second => 1_000,
            FrequencyUnit::Millisecond => 1,
        }
    }

    /// Canonical suffix used in period text
    pub fn suffix(self) -> &'static str {
        match self {
            FrequencyUnit::Day => "D",
            FrequencyUnit::Hour => "H",
            FrequencyUnit::Minute => "min",
            FrequencyUnit::Second => "s",
            FrequencyUnit::Millisecond => "ms",
        }
    }

    /// Truncate a timestamp to the start of the unit containing it
    pub fn floor(self, t: NaiveDateTime) -> NaiveDateTime {
        t.duration_trunc(TimeDelta::milliseconds(self.millis()))
            .unwrap_or(t)
    }

    fn anchor_format(self) -> &'static str {
        match self {
            FrequencyUnit::Day => "%Y-%m-%d",
            FrequencyUnit::Hour | FrequencyUnit::Minute => "%Y-%m-%d %H:%M",
            FrequencyUnit::Second => "%Y-%m-%d %H:%M:%S",
            FrequencyUnit::Millisecond => "%Y-%m-%d %H:%M:%S%.3f",
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "D" | "d" | "day" | "days" => Ok(FrequencyUnit::Day),
            "H" | "h" | "hour" | "hours" => Ok(FrequencyUnit::Hour),
            "T" | "min" | "minute" | "minutes" => Ok(FrequencyUnit::Minute),
            "S" | "s" | "sec" | "second" | "seconds" => Ok(FrequencyUnit::Second),
            "L" | "ms" => Ok(FrequencyUnit::Millisecond),
            other => Err(Error::InvalidPeriod(format!(
                "unknown frequency unit '{}'",
                other
            ))),
        }
    }
}

/// Period length: `count` consecutive units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency {
    count: u32,
    unit: FrequencyUnit,
}

impl Frequency {
    /// One calendar day, the default period length
    pub const DAY: Frequency = Frequency {
        count: 1,
        unit: FrequencyUnit::Day,
    };

    /// Create a frequency; the count must be positive
    pub fn new(count: u32, unit: FrequencyUnit) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidPeriod(
                "frequency count must be positive".to_string(),
            ));
        }
        Ok(Self { count, unit })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Total length covered by this frequency
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::from(self.count) * self.unit.millis())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let count = if digits_end == 0 {
            1
        } else {
            s[..digits_end].parse::<u32>().map_err(|e| {
                Error::InvalidPeriod(format!("invalid frequency count in '{}': {}", s, e))
            })?
        };
        let unit = s[digits_end..].trim().parse()?;
        Frequency::new(count, unit)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.unit.suffix())
        } else {
            write!(f, "{}{}", self.count, self.unit.suffix())
        }
    }
}

/// Result of comparing two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOrdering {
    /// Ends strictly before the other starts
    Before,
    /// Starts strictly after the other ends
    After,
    /// Shares at least one instant with the other
    Overlapping,
}

/// Immutable time interval `[start, end]`, both ends inclusive
#[derive(Debug, Clone, Copy)]
pub struct Period {
    start: NaiveDateTime,
    frequency: Frequency,
}

impl Period {
    /// Period of the given frequency containing `anchor`
    pub fn new(anchor: NaiveDateTime, frequency: Frequency) -> Self {
        Self {
            start: frequency.unit().floor(anchor),
            frequency,
        }
    }

    /// Calendar day as a period
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN), Frequency::DAY)
    }

    /// Custom period starting at `start` and lasting `end - start`
    ///
    /// The length is clamped to at least one millisecond. The frequency unit is
    /// the coarsest one that expresses both the start and the length exactly, so
    /// the canonical text parses back to the same interval.
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let start = FrequencyUnit::Millisecond.floor(start);
        let delta = end - start;
        let mut length_ms = delta.num_milliseconds();
        if delta > TimeDelta::milliseconds(length_ms) {
            length_ms += 1;
        }
        let length_ms = length_ms.max(1);

        let unit = FrequencyUnit::ALL
            .into_iter()
            .find(|unit| unit.floor(start) == start && length_ms % unit.millis() == 0)
            .unwrap_or(FrequencyUnit::Millisecond);
        let count = u32::try_from(length_ms / unit.millis()).unwrap_or(u32::MAX);

        Self {
            start,
            frequency: Frequency { count, unit },
        }
    }

    /// Parse `"<anchor>[;<frequency>]"`, optionally with an explicit frequency
    ///
    /// Giving a frequency both inline and explicitly is rejected as ambiguous.
    pub fn parse(spec: &str, frequency: Option<&str>) -> Result<Self> {
        let mut parts = spec.split(';');
        let anchor = parts.next().unwrap_or_default().trim();
        let inline = parts.next();
        if parts.next().is_some() || (inline.is_some() && frequency.is_some()) {
            return Err(Error::AmbiguousPeriod(spec.to_string()));
        }

        let frequency = match inline.or(frequency) {
            Some(text) => text.parse()?,
            None => Frequency::DAY,
        };
        let period = Self::new(parse_anchor(anchor)?, frequency);
        if period.start.checked_add_signed(frequency.duration()).is_none() {
            return Err(Error::InvalidPeriod(format!(
                "period '{}' of length {} ends outside the supported date range",
                anchor, frequency
            )));
        }
        Ok(period)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last instant of the period (one nanosecond before the next period starts)
    ///
    /// Saturates at the latest representable instant.
    pub fn end(&self) -> NaiveDateTime {
        self.start
            .checked_add_signed(self.frequency.duration())
            .map_or(NaiveDateTime::MAX, |next| next - TimeDelta::nanoseconds(1))
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn length(&self) -> TimeDelta {
        self.frequency.duration()
    }

    /// Inclusive containment on both ends
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end()
    }

    pub fn compare(&self, other: &Period) -> PeriodOrdering {
        if self.end() < other.start {
            PeriodOrdering::Before
        } else if self.start > other.end() {
            PeriodOrdering::After
        } else {
            PeriodOrdering::Overlapping
        }
    }

    pub fn is_disjoint(&self, other: &Period) -> bool {
        self.compare(other) != PeriodOrdering::Overlapping
    }

    /// Text that parses back to an equal period
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }
}

/// First pair of overlapping periods, in start order
///
/// Returns `None` when the periods are pairwise disjoint.
pub fn find_overlap<'a>(periods: impl IntoIterator<Item = &'a Period>) -> Option<(Period, Period)> {
    let mut sorted: Vec<Period> = periods.into_iter().copied().collect();
    sorted.sort_by_key(|p| p.start());
    sorted
        .windows(2)
        .find(|pair| pair[0].compare(&pair[1]) != PeriodOrdering::Before)
        .map(|pair| (pair[0], pair[1]))
}

fn parse_anchor(text: &str) -> Result<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    ANCHOR_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| Error::InvalidPeriod(format!("cannot parse '{}' as a date or time", text)))
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.length() == other.length()
    }
}

impl Eq for Period {}

impl Hash for Period {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.length().num_milliseconds().hash(state);
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let anchor = self.start.format(self.frequency.unit().anchor_format());
        if self.frequency == Frequency::DAY {
            write!(f, "{}", anchor)
        } else {
            write!(f, "{}; {}", anchor, self.frequency)
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_default_frequency_is_one_day() {
        let period: Period = "2021-09-15".parse().unwrap();
        assert_eq!(period.start(), ts("2021-09-15 00:00:00"));
        assert_eq!(period.frequency(), Frequency::DAY);
        assert!(period.contains(ts("2021-09-15 23:59:59")));
        assert!(!period.contains(ts("2021-09-16 00:00:00")));
    }

    #[test]
    fn test_anchor_floored_to_unit() {
        let period = Period::parse("2021-09-15 10:42", Some("H")).unwrap();
        assert_eq!(period.start(), ts("2021-09-15 10:00:00"));
        assert_eq!(period.end(), ts("2021-09-15 11:00:00") - TimeDelta::nanoseconds(1));
    }

    #[test]
    fn test_containment_is_inclusive() {
        let period: Period = "2021-09-15 10:30; 90min".parse().unwrap();
        assert!(period.contains(period.start()));
        assert!(period.contains(period.end()));
        assert!(!period.contains(period.start() - TimeDelta::nanoseconds(1)));
        assert!(!period.contains(period.end() + TimeDelta::nanoseconds(1)));
    }

    #[test]
    fn test_ambiguous_length_rejected() {
        assert!(matches!(
            Period::parse("2021-09-15;D", Some("H")),
            Err(Error::AmbiguousPeriod(_))
        ));
        assert!(matches!(
            Period::parse("2021-09-15;D;H", None),
            Err(Error::AmbiguousPeriod(_))
        ));
    }

    #[test]
    fn test_invalid_text_rejected() {
        assert!(matches!(
            "yesterday".parse::<Period>(),
            Err(Error::InvalidPeriod(_))
        ));
        assert!(matches!(
            Period::parse("2021-09-15", Some("0min")),
            Err(Error::InvalidPeriod(_))
        ));
        assert!(matches!(
            Period::parse("2021-09-15", Some("3 weeks")),
            Err(Error::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_unrepresentable_end_rejected() {
        assert!(matches!(
            Period::parse("2021-09-15", Some("100000000D")),
            Err(Error::InvalidPeriod(_))
        ));
        assert!(matches!(
            "2021-09-15; 100000000D".parse::<Period>(),
            Err(Error::InvalidPeriod(_))
        ));

        let long = Period::parse("2021-09-15", Some("1000000D")).unwrap();
        assert!(long.contains(ts("2021-09-16 00:00:00")));
    }

    #[test]
    fn test_end_saturates_at_last_instant() {
        let last = Period::day(NaiveDate::MAX);
        assert_eq!(last.end(), NaiveDateTime::MAX);
        assert!(last.contains(NaiveDateTime::MAX));
        assert_eq!(
            last.compare(&Period::day(NaiveDate::from_ymd_opt(2021, 9, 15).unwrap())),
            PeriodOrdering::After
        );
    }

    #[test]
    fn test_canonical_text_round_trips() {
        for text in [
            "2021-09-15",
            "2021-09-15 10:00; H",
            "2021-09-15 10:30; 90min",
            "2021-09-15 10:30:15; 45s",
            "2021-09-15 10:30:15.250; 10ms",
            "2021-09-15; 7D",
        ] {
            let period: Period = text.parse().unwrap();
            assert_eq!(period.canonical_text(), text);
            let reparsed: Period = period.canonical_text().parse().unwrap();
            assert_eq!(reparsed, period);
        }
    }

    #[test]
    fn test_pandas_style_units_accepted() {
        let minutes = Period::parse("2021-09-15 10:30", Some("50T")).unwrap();
        assert_eq!(minutes.to_string(), "2021-09-15 10:30; 50min");
        let millis = Period::parse("2021-09-15 10:30:00", Some("5L")).unwrap();
        assert_eq!(millis.length(), TimeDelta::milliseconds(5));
    }

    #[test]
    fn test_equality_by_interval() {
        let day: Period = "2021-09-15".parse().unwrap();
        let hours = Period::parse("2021-09-15 00:00", Some("24H")).unwrap();
        assert_eq!(day, hours);

        let other: Period = "2021-09-16".parse().unwrap();
        assert_ne!(day, other);
    }

    #[test]
    fn test_three_way_comparison() {
        let morning = Period::parse("2021-09-15 09:00", Some("H")).unwrap();
        let late_morning = Period::parse("2021-09-15 10:00", Some("H")).unwrap();
        let whole_day: Period = "2021-09-15".parse().unwrap();

        assert_eq!(morning.compare(&late_morning), PeriodOrdering::Before);
        assert_eq!(late_morning.compare(&morning), PeriodOrdering::After);
        assert_eq!(morning.compare(&whole_day), PeriodOrdering::Overlapping);
        assert_eq!(whole_day.compare(&morning), PeriodOrdering::Overlapping);
        // Equal periods overlap rather than compare equal
        assert_eq!(morning.compare(&morning), PeriodOrdering::Overlapping);
    }

    #[test]
    fn test_between_clamps_to_minimum_length() {
        let t = ts("2021-09-15 10:30:00");
        let period = Period::between(t, t);
        assert_eq!(period.length(), TimeDelta::milliseconds(1));
        assert!(period.contains(t));

        let backwards = Period::between(t, t - TimeDelta::minutes(5));
        assert_eq!(backwards.length(), TimeDelta::milliseconds(1));
        assert!(backwards.end() >= backwards.start());
    }

    #[test]
    fn test_between_covers_both_ends() {
        let first = ts("2021-09-15 10:30:15");
        let last = ts("2021-09-15 10:32:15");
        let period = Period::between(first, last);
        assert_eq!(period.start(), first);
        assert!(period.contains(first));
        // length is `last - first`, so the period stops one tick short of `last`
        assert!(period.contains(last - TimeDelta::nanoseconds(1)));
        assert_eq!(period.to_string(), "2021-09-15 10:30:15; 120s");

        let reparsed: Period = period.to_string().parse().unwrap();
        assert_eq!(reparsed, period);
    }

    #[test]
    fn test_find_overlap_matches_pairwise_check() {
        let candidates: Vec<Period> = [
            ("2021-09-15 09:00", "H"),
            ("2021-09-15 10:00", "H"),
            ("2021-09-15 10:30", "30min"),
            ("2021-09-15 00:00", "D"),
            ("2021-09-16 09:00", "2H"),
        ]
        .iter()
        .map(|(anchor, freq)| Period::parse(anchor, Some(freq)).unwrap())
        .collect();

        // every subset of the candidates
        for mask in 0u32..(1 << candidates.len()) {
            let subset: Vec<Period> = candidates
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| *p)
                .collect();

            let pairwise_disjoint = subset.iter().enumerate().all(|(i, a)| {
                subset.iter().skip(i + 1).all(|b| a.is_disjoint(b))
            });
            assert_eq!(
                find_overlap(&subset).is_none(),
                pairwise_disjoint,
                "subset mask {:b}",
                mask
            );
        }
    }
}
