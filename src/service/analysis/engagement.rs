//! Geographic and temporal engagement patterns.

use std::collections::HashMap;

use crate::model::analysis::{ActivityPace, EngagementPatterns, EngagementStyle};
use crate::model::killmail::FetchedKillmail;

/// System concentration above which activity reads as a gate camp.
const GATE_CAMP_CONCENTRATION: f64 = 0.5;
/// Concentration above which activity reads as territorial.
const TERRITORIAL_CONCENTRATION: f64 = 0.3;

pub fn analyze(killmails: &[FetchedKillmail]) -> EngagementPatterns {
    let mut per_system: HashMap<i64, usize> = HashMap::new();
    for killmail in killmails {
        *per_system.entry(killmail.killmail.solar_system_id).or_default() += 1;
    }

    let top = per_system.iter().max_by_key(|(_, &count)| count);
    let (top_system_id, top_count) = match top {
        Some((&system, &count)) => (Some(system), count),
        None => (None, 0),
    };

    let system_concentration = if killmails.is_empty() {
        0.0
    } else {
        top_count as f64 / killmails.len() as f64
    };

    let style = if system_concentration > GATE_CAMP_CONCENTRATION {
        EngagementStyle::GateCamp
    } else if system_concentration > TERRITORIAL_CONCENTRATION {
        EngagementStyle::Territorial
    } else {
        EngagementStyle::Roaming
    };

    let avg_gap_minutes = average_gap_minutes(killmails);
    let pace = if killmails.len() < 2 {
        ActivityPace::Sporadic
    } else if avg_gap_minutes <= 60.0 {
        ActivityPace::Rapid
    } else if avg_gap_minutes <= 360.0 {
        ActivityPace::Active
    } else if avg_gap_minutes <= 1440.0 {
        ActivityPace::Moderate
    } else {
        ActivityPace::Sporadic
    };

    EngagementPatterns {
        system_concentration,
        top_system_id,
        style,
        avg_gap_minutes,
        pace,
    }
}

fn average_gap_minutes(killmails: &[FetchedKillmail]) -> f64 {
    if killmails.len() < 2 {
        return 0.0;
    }

    let mut times: Vec<_> = killmails
        .iter()
        .map(|k| k.killmail.killmail_time)
        .collect();
    times.sort();

    let gaps: Vec<f64> = times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 60.0)
        .collect();

    gaps.iter().sum::<f64>() / gaps.len() as f64
}
