//! Victim ship-size preferences.

use std::collections::HashMap;

use crate::model::analysis::{SizeShare, TargetPreferences};
use crate::model::killmail::FetchedKillmail;
use crate::reference::{class_of_type, ShipSize};
use crate::util::math::largest_remainder_percentages;

/// Victim share (percent) that marks a specialized hunter.
const HUNTER_SHARE: u32 = 20;

pub fn analyze(killmails: &[FetchedKillmail]) -> TargetPreferences {
    let mut counts: HashMap<ShipSize, usize> = HashMap::new();
    let mut industrial_victims = 0usize;
    let mut capital_victims = 0usize;

    for killmail in killmails {
        let class = class_of_type(killmail.killmail.victim.ship_type_id);
        let size = class.map(|c| c.size).unwrap_or(ShipSize::Other);
        *counts.entry(size).or_default() += 1;

        if let Some(class) = class {
            if class.is_industrial() {
                industrial_victims += 1;
            }
            if class.is_capital() {
                capital_victims += 1;
            }
        }
    }

    let total = killmails.len();
    let mut sizes: Vec<(ShipSize, usize)> = counts.into_iter().collect();
    // Count descending, then an arbitrary-but-stable order on ties.
    sizes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| format!("{:?}", a.0).cmp(&format!("{:?}", b.0))));

    let count_values: Vec<usize> = sizes.iter().map(|(_, count)| *count).collect();
    let percentages = largest_remainder_percentages(&count_values);

    let ship_sizes = sizes
        .into_iter()
        .zip(percentages)
        .map(|((size, count), percentage)| SizeShare {
            size,
            count,
            percentage,
        })
        .collect();

    let share = |count: usize| {
        if total > 0 {
            ((count * 100) as f64 / total as f64).round() as u32
        } else {
            0
        }
    };

    TargetPreferences {
        ship_sizes,
        industrial_hunter: share(industrial_victims) >= HUNTER_SHARE,
        capital_hunter: share(capital_victims) >= HUNTER_SHARE,
    }
}

#[cfg(test)]
mod tests {
    use crate::util::test::fetched_killmail_with_victim;

    use super::*;

    fn kills(victim_types: &[i64]) -> Vec<FetchedKillmail> {
        victim_types
            .iter()
            .enumerate()
            .map(|(i, &ship)| {
                fetched_killmail_with_victim(
                    9000 + i as i64,
                    "2026-08-01T12:00:00Z",
                    30000142,
                    1001,
                    ship,
                )
            })
            .collect()
    }

    #[test]
    fn size_percentages_sum_to_100() {
        // Rifter (frigate), Drake (battlecruiser), Retriever (barge).
        let killmails = kills(&[587, 24698, 17478]);
        let result = analyze(&killmails);

        let sum: u32 = result.ship_sizes.iter().map(|s| s.percentage).sum();
        assert_eq!(sum, 100);
        assert_eq!(result.ship_sizes.len(), 3);
    }

    #[test]
    fn industrial_hunter_at_twenty_percent() {
        // Two barges out of five victims.
        let killmails = kills(&[17478, 17478, 587, 587, 587]);
        let result = analyze(&killmails);

        assert!(result.industrial_hunter);
        assert!(!result.capital_hunter);
    }

    #[test]
    fn capital_hunter_flags_on_capital_victims() {
        // Archon carrier out of two victims.
        let killmails = kills(&[23757, 587]);
        let result = analyze(&killmails);

        assert!(result.capital_hunter);
    }

    #[test]
    fn unknown_hull_counts_as_other() {
        let killmails = kills(&[999_999]);
        let result = analyze(&killmails);

        assert_eq!(result.ship_sizes[0].size, ShipSize::Other);
        assert_eq!(result.ship_sizes[0].percentage, 100);
    }
}
