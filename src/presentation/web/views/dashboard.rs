use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::formatting::{SENTINEL, format_delta, format_tenths};

pub struct YearOptionView {
    pub value: i32,
    pub selected: bool,
}

/// One bar of the monthly chart, scaled against the busiest month.
pub struct MonthBarView {
    pub label: String,
    pub count: u32,
    pub height_percent: u32,
}

/// Display-ready dashboard. Every field is already formatted, sentinels
/// included.
pub struct DashboardView {
    pub selected_year: i32,
    pub years: Vec<YearOptionView>,
    pub months: Vec<MonthBarView>,
    pub total_for_year: u32,
    pub average_per_month: String,
    pub best_month: String,
    pub average_rating: String,
    pub top_tag: String,
    pub previous_year_total: u32,
    pub year_over_year: String,
    pub has_comparison: bool,
    pub reader_profile: &'static str,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let max = snapshot.max_monthly_count().max(1);
        let months = snapshot
            .monthly_counts
            .iter()
            .map(|entry| MonthBarView {
                label: entry.month.clone(),
                count: entry.count,
                height_percent: entry.count * 100 / max,
            })
            .collect();

        let years = snapshot
            .available_years
            .iter()
            .map(|&value| YearOptionView {
                value,
                selected: value == snapshot.selected_year,
            })
            .collect();

        let best_month = if snapshot.best_month.is_sentinel() {
            SENTINEL.to_string()
        } else {
            format!(
                "{} ({})",
                snapshot.best_month.month, snapshot.best_month.count
            )
        };

        Self {
            selected_year: snapshot.selected_year,
            years,
            months,
            total_for_year: snapshot.total_for_year,
            average_per_month: format_tenths(snapshot.average_per_month),
            best_month,
            average_rating: snapshot
                .average_rating
                .value()
                .map_or_else(|| SENTINEL.to_string(), |r| format_tenths(*r)),
            top_tag: snapshot.top_tag.to_string(),
            previous_year_total: snapshot.previous_year_total,
            year_over_year: format_delta(snapshot.year_over_year_delta_percent),
            has_comparison: snapshot.year_over_year_delta_percent.is_some(),
            reader_profile: snapshot.reader_profile.label(),
        }
    }
}
