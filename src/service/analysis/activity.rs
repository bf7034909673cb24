//! Temporal activity: hour-of-day histogram and solo/fleet split.

use chrono::Timelike;

use crate::model::analysis::{ShareCount, SoloVsFleet, TimeAnalysis};
use crate::model::killmail::FetchedKillmail;
use crate::util::math::largest_remainder_percentages;

/// 24-bucket UTC-hour histogram with peak and quietest non-zero hours.
pub fn time_histogram(killmails: &[FetchedKillmail]) -> TimeAnalysis {
    let mut hourly = vec![0usize; 24];
    for killmail in killmails {
        hourly[killmail.killmail.killmail_time.hour() as usize] += 1;
    }

    let peak_hour = hourly
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .max_by_key(|(_, &count)| count)
        .map(|(hour, _)| hour as u32);

    let quietest_hour = hourly
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .min_by_key(|(_, &count)| count)
        .map(|(hour, _)| hour as u32);

    TimeAnalysis {
        hourly,
        peak_hour,
        quietest_hour,
    }
}

/// Splits kills into solo (1 attacker), small gang (2-10), and fleet
/// (>10). Percentages use largest-remainder rounding so they always sum
/// to exactly 100 when any killmail exists.
pub fn solo_vs_fleet(killmails: &[FetchedKillmail]) -> SoloVsFleet {
    let mut solo = 0usize;
    let mut small_gang = 0usize;
    let mut fleet = 0usize;

    for killmail in killmails {
        match killmail.killmail.attackers.len() {
            1 => solo += 1,
            2..=10 => small_gang += 1,
            _ => fleet += 1,
        }
    }

    let percentages = largest_remainder_percentages(&[solo, small_gang, fleet]);

    SoloVsFleet {
        solo: ShareCount {
            count: solo,
            percentage: percentages[0],
        },
        small_gang: ShareCount {
            count: small_gang,
            percentage: percentages[1],
        },
        fleet: ShareCount {
            count: fleet,
            percentage: percentages[2],
        },
    }
}
