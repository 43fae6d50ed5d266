//! Yearly "reading wrapped" aggregation.
//!
//! [`compute_dashboard`] is a pure function over one user's book records. It
//! performs no I/O and keeps no state between calls, so the same records and
//! request always produce the same [`DashboardSnapshot`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{Datelike, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::domain::book_items::Book;
use crate::domain::formatting::{SENTINEL, round_half_up, round_to_tenth};
use crate::domain::ids::{BookId, UserId};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The average is always taken over a full year, not months elapsed.
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    #[error("book {book_id} has a non-numeric rating ({rating})")]
    InvalidRating { book_id: BookId, rating: f64 },
    #[error("book {book_id} belongs to user {owner}, not user {requested}")]
    ForeignRecord {
        book_id: BookId,
        owner: UserId,
        requested: UserId,
    },
    #[error("invalid year: {0:?}")]
    InvalidYear(String),
}

/// Parse a year selector. Non-numeric and non-positive input is rejected;
/// the caller decides whether to fall back to a default.
pub fn parse_year(raw: &str) -> Result<i32, DashboardError> {
    match raw.trim().parse::<i32>() {
        Ok(year) if year > 0 => Ok(year),
        _ => Err(DashboardError::InvalidYear(raw.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardRequest {
    pub user_id: UserId,
    pub year: Option<i32>,
    pub current_year: i32,
}

impl DashboardRequest {
    pub fn new(user_id: UserId, year: Option<i32>) -> Self {
        Self {
            user_id,
            year,
            current_year: Utc::now().year(),
        }
    }

    #[must_use]
    pub fn with_current_year(mut self, current_year: i32) -> Self {
        self.current_year = current_year;
        self
    }

    pub fn selected_year(&self) -> i32 {
        self.year.filter(|y| *y > 0).unwrap_or(self.current_year)
    }
}

/// A derived value that may be "not applicable". Serializes as the value
/// itself or as the `"-"` sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric<T> {
    Value(T),
    NotApplicable,
}

impl<T> Metric<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotApplicable => None,
        }
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotApplicable, Self::Value)
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => v.fmt(f),
            Self::NotApplicable => f.write_str(SENTINEL),
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::NotApplicable => serializer.serialize_str(SENTINEL),
        }
    }
}

/// Matches only the literal sentinel string.
struct SentinelMarker;

impl<'de> Deserialize<'de> for SentinelMarker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == SENTINEL {
            Ok(Self)
        } else {
            Err(de::Error::custom("expected sentinel"))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricRepr<T> {
    Sentinel(#[allow(dead_code)] SentinelMarker),
    Value(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Metric<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match MetricRepr::deserialize(deserializer)? {
            MetricRepr::Sentinel(_) => Self::NotApplicable,
            MetricRepr::Value(v) => Self::Value(v),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month_number: u32,
    pub month: String,
    pub count: u32,
}

impl MonthCount {
    fn new(month_number: u32, count: u32) -> Self {
        Self {
            month_number,
            month: month_label(month_number).to_string(),
            count,
        }
    }
}

/// Month with the most books. `month_number` is `None` for the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMonth {
    pub month_number: Option<u32>,
    pub month: String,
    pub count: u32,
}

impl BestMonth {
    pub fn none() -> Self {
        Self {
            month_number: None,
            month: SENTINEL.to_string(),
            count: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.month_number.is_none()
    }
}

impl From<&MonthCount> for BestMonth {
    fn from(entry: &MonthCount) -> Self {
        Self {
            month_number: Some(entry.month_number),
            month: entry.month.clone(),
            count: entry.count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReaderProfile {
    #[serde(rename = "extremely consistent reader")]
    ExtremelyConsistent,
    #[serde(rename = "consistent reader")]
    Consistent,
    #[serde(rename = "occasional reader")]
    Occasional,
    #[serde(rename = "new reader")]
    New,
}

impl ReaderProfile {
    /// First matching tier wins.
    pub fn classify(average_per_month: f64, total_for_year: u32) -> Self {
        if average_per_month >= 3.0 {
            Self::ExtremelyConsistent
        } else if average_per_month >= 1.0 {
            Self::Consistent
        } else if total_for_year > 0 {
            Self::Occasional
        } else {
            Self::New
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ExtremelyConsistent => "extremely consistent reader",
            Self::Consistent => "consistent reader",
            Self::Occasional => "occasional reader",
            Self::New => "new reader",
        }
    }
}

impl fmt::Display for ReaderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub available_years: Vec<i32>,
    pub selected_year: i32,
    pub monthly_counts: Vec<MonthCount>,
    pub total_for_year: u32,
    pub average_per_month: f64,
    pub best_month: BestMonth,
    pub average_rating: Metric<f64>,
    pub top_tag: Metric<String>,
    pub previous_year_total: u32,
    pub year_over_year_delta_percent: Option<i64>,
    pub reader_profile: ReaderProfile,
}

impl DashboardSnapshot {
    /// Largest monthly count, for scaling bar charts.
    pub fn max_monthly_count(&self) -> u32 {
        self.best_month.count
    }
}

/// Derive every dashboard metric for one user and year.
///
/// `records` may be the user's full record set or already narrowed to a year;
/// year-scoped metrics only look at records read in the selected year.
/// Records owned by another user or carrying a non-finite rating are a
/// defect in the feed and are rejected instead of being counted.
pub fn compute_dashboard(
    records: &[Book],
    request: &DashboardRequest,
) -> Result<DashboardSnapshot, DashboardError> {
    validate_feed(records, request.user_id)?;

    let selected_year = request.selected_year();
    let in_year: Vec<&Book> = records
        .iter()
        .filter(|book| book.was_read_in(selected_year))
        .collect();

    let monthly_counts = monthly_counts(&in_year);
    let total_for_year: u32 = monthly_counts.iter().map(|m| m.count).sum();
    let average_per_month = average_per_month(total_for_year);
    let previous_year_total = count_read_in(records, selected_year - 1);

    Ok(DashboardSnapshot {
        available_years: available_years(records, request.current_year),
        selected_year,
        best_month: best_month(&monthly_counts),
        monthly_counts,
        total_for_year,
        average_per_month,
        average_rating: average_rating(&in_year),
        top_tag: top_tag(&in_year),
        previous_year_total,
        year_over_year_delta_percent: year_over_year_delta(total_for_year, previous_year_total),
        reader_profile: ReaderProfile::classify(average_per_month, total_for_year),
    })
}

fn validate_feed(records: &[Book], user_id: UserId) -> Result<(), DashboardError> {
    for book in records {
        if book.user_id != user_id {
            return Err(DashboardError::ForeignRecord {
                book_id: book.id,
                owner: book.user_id,
                requested: user_id,
            });
        }
        if let Some(rating) = book.rating
            && !rating.is_finite()
        {
            return Err(DashboardError::InvalidRating {
                book_id: book.id,
                rating,
            });
        }
    }
    Ok(())
}

fn month_label(month_number: u32) -> &'static str {
    month_number
        .checked_sub(1)
        .and_then(|idx| MONTH_LABELS.get(idx as usize))
        .copied()
        .unwrap_or(SENTINEL)
}

/// Distinct years with at least one dated record, newest first.
fn available_years(records: &[Book], current_year: i32) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().filter_map(Book::year_read).collect();
    if years.is_empty() {
        vec![current_year]
    } else {
        years.into_iter().rev().collect()
    }
}

fn monthly_counts(in_year: &[&Book]) -> Vec<MonthCount> {
    let mut buckets = [0u32; 12];
    for date in in_year.iter().filter_map(|book| book.date_read) {
        buckets[date.month0() as usize] += 1;
    }
    (1u32..)
        .zip(buckets)
        .filter(|(_, count)| *count > 0)
        .map(|(month, count)| MonthCount::new(month, count))
        .collect()
}

fn average_per_month(total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to_tenth(f64::from(total) / MONTHS_PER_YEAR)
}

/// Left-to-right reduction keeping strictly greater counts, so the earliest
/// month wins a tie.
fn best_month(monthly_counts: &[MonthCount]) -> BestMonth {
    let Some((first, rest)) = monthly_counts.split_first() else {
        return BestMonth::none();
    };
    let best = rest
        .iter()
        .fold(first, |best, entry| if entry.count > best.count { entry } else { best });
    BestMonth::from(best)
}

fn average_rating(in_year: &[&Book]) -> Metric<f64> {
    let ratings: Vec<f64> = in_year.iter().filter_map(|book| book.rating).collect();
    if ratings.is_empty() {
        return Metric::NotApplicable;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    Metric::Value(round_to_tenth(mean))
}

/// Most frequent normalized tag. Records are scanned in input order and the
/// winner only changes when a tag strictly exceeds the running maximum, so the
/// first tag to reach the top count keeps it.
fn top_tag(in_year: &[&Book]) -> Metric<String> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut leader: Option<(String, u32)> = None;

    for tag in in_year.iter().flat_map(|book| book.tag_tokens()) {
        let count = counts.entry(tag.clone()).or_insert(0);
        *count += 1;
        let leading = leader.as_ref().map_or(0, |(_, c)| *c);
        if *count > leading {
            leader = Some((tag, *count));
        }
    }

    leader.map(|(tag, _)| tag).into()
}

fn count_read_in(records: &[Book], year: i32) -> u32 {
    let count = records.iter().filter(|book| book.was_read_in(year)).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Percentage change against the previous year. `None` when there is no
/// baseline to compare against.
fn year_over_year_delta(total: u32, previous: u32) -> Option<i64> {
    if previous == 0 {
        return None;
    }
    let change = (f64::from(total) - f64::from(previous)) / f64::from(previous) * 100.0;
    Some(round_half_up(change))
}
