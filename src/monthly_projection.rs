use chrono::NaiveDate;

use crate::record_normalizer::NormalizedCount;

/// An observed daily count scaled to a full calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyProjection {
    pub item: String,
    pub display_label: String,
    pub daily_count: f64,
    pub days_in_month: u32,
    pub monthly_count: f64,
}

/// Exact Gregorian day count for the given month, leap years included.
///
/// Returns `None` for an invalid (year, month) pair.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Scale each observed count to a monthly total over `days` days.
///
/// The arithmetic stays in `f64` so fractional observed counts flow
/// through without rounding.
pub fn project_monthly(counts: &[NormalizedCount], days: u32) -> Vec<MonthlyProjection> {
    counts
        .iter()
        .map(|count| MonthlyProjection {
            item: count.item.clone(),
            display_label: count.display_label.clone(),
            daily_count: count.observed_count,
            days_in_month: days,
            monthly_count: count.observed_count * f64::from(days),
        })
        .collect()
}
