//! High-value-target hunting profile.

use chrono::DateTime;
use chrono::Utc;

use crate::model::analysis::{Confidence, HvtAnalysis, TimeSpread};
use crate::model::killmail::FetchedKillmail;

/// ISK thresholds for the high / very high / extreme tiers.
pub const HIGH_VALUE: f64 = 500_000_000.0;
pub const VERY_HIGH_VALUE: f64 = 1_000_000_000.0;
pub const EXTREME_VALUE: f64 = 5_000_000_000.0;

/// Minimum HVT count for the strict hunter rule.
const MIN_HVT_COUNT: usize = 5;
/// HVT share (percent) that qualifies a hunter at ten or more HVT kills.
const HUNTER_FREQUENCY: u32 = 20;
/// HVT share (percent) that qualifies a hunter at the minimum count.
const STRICT_HUNTER_FREQUENCY: u32 = 40;

pub fn analyze(killmails: &[FetchedKillmail]) -> HvtAnalysis {
    let total = killmails.len();

    let mut high = 0usize;
    let mut very_high = 0usize;
    let mut extreme = 0usize;
    let mut hvt_values = Vec::new();
    let mut hvt_times: Vec<DateTime<Utc>> = Vec::new();
    let mut non_hvt_values = Vec::new();

    for killmail in killmails {
        let value = killmail.zkb.total_value;
        if value >= HIGH_VALUE {
            match value {
                v if v >= EXTREME_VALUE => extreme += 1,
                v if v >= VERY_HIGH_VALUE => very_high += 1,
                _ => high += 1,
            }
            hvt_values.push(value);
            hvt_times.push(killmail.killmail.killmail_time);
        } else {
            non_hvt_values.push(value);
        }
    }

    let total_hvt = hvt_values.len();
    let frequency_percent = if total > 0 {
        ((total_hvt * 100) as f64 / total as f64).round() as u32
    } else {
        0
    };

    let avg_hvt_value = mean(&hvt_values);
    let avg_non_hvt = mean(&non_hvt_values);
    let value_ratio = if avg_non_hvt > 0.0 {
        avg_hvt_value / avg_non_hvt
    } else {
        0.0
    };

    let avg_value = if total > 0 {
        killmails.iter().map(|k| k.zkb.total_value).sum::<f64>() / total as f64
    } else {
        0.0
    };

    let is_hvt_hunter = avg_value > HIGH_VALUE
        && ((total_hvt >= 10 && frequency_percent >= HUNTER_FREQUENCY)
            || (total_hvt >= MIN_HVT_COUNT && frequency_percent >= STRICT_HUNTER_FREQUENCY));

    HvtAnalysis {
        high,
        very_high,
        extreme,
        total_hvt,
        frequency_percent,
        avg_hvt_value,
        value_ratio,
        time_spread: time_spread(&mut hvt_times),
        confidence: confidence(total, total_hvt),
        is_hvt_hunter,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Classifies the average gap between consecutive HVT kills.
fn time_spread(times: &mut Vec<DateTime<Utc>>) -> TimeSpread {
    if times.len() < 2 {
        return TimeSpread::Sporadic;
    }

    times.sort();
    let gaps: Vec<f64> = times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 3600.0)
        .collect();
    let avg_gap_hours = gaps.iter().sum::<f64>() / gaps.len() as f64;

    match avg_gap_hours {
        g if g < 24.0 => TimeSpread::Frequent,
        g if g < 72.0 => TimeSpread::Regular,
        g if g < 168.0 => TimeSpread::Occasional,
        _ => TimeSpread::Sporadic,
    }
}

fn confidence(sample_size: usize, hvt_count: usize) -> Confidence {
    if sample_size >= 100 && hvt_count >= 10 {
        Confidence::High
    } else if sample_size >= 50 && hvt_count >= 5 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}
