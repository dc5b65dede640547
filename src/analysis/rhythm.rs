//! Weekly activity rhythm from pre-aggregated hourly counts.
//!
//! The aggregation itself happens outside the crate (the historical store
//! buckets keypresses by day-of-week and hour); this module builds the dense
//! 7x24 matrix, finds the peak, and phrases the insights.

use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;

/// Sunday-first, matching the aggregation's day numbering.
const DAY_NAMES: [&str; DAYS_PER_WEEK] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Human-readable day name for a Sunday-first 0-6 index.
pub fn day_name(day: usize) -> Option<&'static str> {
    DAY_NAMES.get(day).copied()
}

/// One pre-aggregated bucket: keypresses in one day-of-week/hour cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyActivity {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: usize,
    /// 0 - 23
    pub hour: usize,
    pub keypress_count: u64,
}

/// Weekly rhythm summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyRhythm {
    /// Day of the busiest cell; `None` only for empty input
    pub peak_day: Option<usize>,
    /// Hour of the busiest cell; `None` only for empty input
    pub peak_hour: Option<usize>,
    /// Dense day-major matrix of keypress counts; empty for empty input
    pub activity_matrix: Vec<Vec<u64>>,
    /// Up to two human-readable observations
    pub insights: Vec<String>,
}

impl WeeklyRhythm {
    fn empty() -> Self {
        Self {
            peak_day: None,
            peak_hour: None,
            activity_matrix: Vec::new(),
            insights: Vec::new(),
        }
    }
}

/// Summarize weekly typing rhythm from hourly buckets.
///
/// Counts for the same cell accumulate. Records outside the 7x24 grid are
/// skipped with a warning rather than aborting the summary. The peak cell is
/// found by a day-major, hour-ascending scan with strict-greater comparison,
/// so the first of several equal maxima wins.
pub fn weekly_rhythm(hourly_stats: &[HourlyActivity]) -> WeeklyRhythm {
    if hourly_stats.is_empty() {
        return WeeklyRhythm::empty();
    }

    let mut matrix = vec![vec![0u64; HOURS_PER_DAY]; DAYS_PER_WEEK];
    for stat in hourly_stats {
        if stat.day_of_week >= DAYS_PER_WEEK || stat.hour >= HOURS_PER_DAY {
            tracing::warn!(
                day_of_week = stat.day_of_week,
                hour = stat.hour,
                "skipping hourly bucket outside the weekly grid"
            );
            continue;
        }
        matrix[stat.day_of_week][stat.hour] =
            matrix[stat.day_of_week][stat.hour].saturating_add(stat.keypress_count);
    }

    let mut max_activity = 0u64;
    let mut peak_day = 0;
    let mut peak_hour = 0;
    for (day, row) in matrix.iter().enumerate() {
        for (hour, &count) in row.iter().enumerate() {
            if count > max_activity {
                max_activity = count;
                peak_day = day;
                peak_hour = hour;
            }
        }
    }

    let mut insights = Vec::new();
    if max_activity > 0 {
        insights.push(format!(
            "Peak activity: {} at {}:00",
            DAY_NAMES[peak_day], peak_hour
        ));
    }

    let daily_totals: Vec<u64> = matrix.iter().map(|row| row.iter().sum()).collect();
    if daily_totals.iter().any(|&total| total > 0) {
        let mut most_active_day = 0;
        let mut best = 0u64;
        for (day, &total) in daily_totals.iter().enumerate() {
            if total > best {
                best = total;
                most_active_day = day;
            }
        }
        insights.push(format!("Most active day: {}", DAY_NAMES[most_active_day]));
    }

    WeeklyRhythm {
        peak_day: Some(peak_day),
        peak_hour: Some(peak_hour),
        activity_matrix: matrix,
        insights,
    }
}
