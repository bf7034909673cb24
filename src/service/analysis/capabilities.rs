//! Black ops, cyno, and capital capability detection.
//!
//! Works off the subject's attacker rows and the fixed classification
//! tables. One killmail counts once per capability regardless of how
//! many matching rows it carries.

use std::collections::HashSet;

use crate::model::analysis::{CapabilityAnalysis, Confidence, CynoAnalysis, CynoRole};
use crate::model::killmail::FetchedKillmail;
use crate::reference::{class_of_type, is_cyno_module};

use super::SubjectFilter;

/// Cyno sightings below this stay undetected; a single light is noise.
const CYNO_DETECTION_THRESHOLD: usize = 2;

pub fn analyze(
    killmails: &[FetchedKillmail],
    subject: &SubjectFilter,
) -> (CapabilityAnalysis, CynoAnalysis, CapabilityAnalysis) {
    let sample_size = killmails.len();

    let mut blops_count = 0usize;
    let mut blops_ships: HashSet<i64> = HashSet::new();
    let mut capital_count = 0usize;
    let mut capital_ships: HashSet<i64> = HashSet::new();
    let mut cyno_count = 0usize;
    let mut cyno_ships: HashSet<i64> = HashSet::new();
    let mut hot_drop_count = 0usize;

    for killmail in killmails {
        let mut flew_blops = false;
        let mut flew_capital = false;
        let mut lit_cyno = false;

        for attacker in &killmail.killmail.attackers {
            if !subject.matches(attacker) {
                continue;
            }

            if let Some(ship) = attacker.ship_type_id {
                if let Some(class) = class_of_type(ship) {
                    if class.is_black_ops() {
                        flew_blops = true;
                        blops_ships.insert(ship);
                    }
                    if class.is_capital() {
                        flew_capital = true;
                        capital_ships.insert(ship);
                    }
                }
            }

            if attacker.weapon_type_id.is_some_and(is_cyno_module) {
                lit_cyno = true;
                if let Some(ship) = attacker.ship_type_id {
                    cyno_ships.insert(ship);
                }
            }
        }

        if flew_blops {
            blops_count += 1;
        }
        if flew_capital {
            capital_count += 1;
        }
        if lit_cyno {
            cyno_count += 1;
            // A cyno on a kill where capitals or black ops also appear is
            // the hot-drop pattern, regardless of who flew them.
            let dropped_on = killmail.killmail.attackers.iter().any(|a| {
                a.ship_type_id
                    .and_then(class_of_type)
                    .is_some_and(|class| class.is_capital() || class.is_black_ops())
            });
            if dropped_on {
                hot_drop_count += 1;
            }
        }
    }

    let black_ops = capability(sample_size, blops_count, blops_ships.len());
    let capital = capability(sample_size, capital_count, capital_ships.len());

    let cyno_detected = cyno_count >= CYNO_DETECTION_THRESHOLD;
    let role = if !cyno_detected {
        None
    } else if hot_drop_count >= CYNO_DETECTION_THRESHOLD {
        Some(CynoRole::HotDrop)
    } else {
        Some(CynoRole::Alt)
    };

    let cyno = CynoAnalysis {
        detected: cyno_detected,
        confidence: confidence(sample_size, cyno_count),
        count: cyno_count,
        frequency_percent: percent(cyno_count, sample_size),
        unique_ships: cyno_ships.len(),
        sample_size,
        role,
    };

    (black_ops, cyno, capital)
}

fn capability(sample_size: usize, count: usize, unique_ships: usize) -> CapabilityAnalysis {
    if count == 0 {
        return CapabilityAnalysis::absent(sample_size);
    }

    CapabilityAnalysis {
        detected: true,
        confidence: confidence(sample_size, count),
        count,
        frequency_percent: percent(count, sample_size),
        unique_ships,
        sample_size,
    }
}

fn confidence(sample_size: usize, count: usize) -> Confidence {
    if count >= 5 && sample_size >= 50 {
        Confidence::High
    } else if count >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 100) as f64 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use crate::util::test::killmail_with_attackers;
    use serde_json::json;

    use crate::model::entity::EntityKind;

    use super::*;

    fn subject() -> SubjectFilter {
        SubjectFilter {
            kind: EntityKind::Character,
            id: 1001,
        }
    }

    #[test]
    fn black_ops_hull_is_detected() {
        // Sin (black ops battleship).
        let killmails = vec![killmail_with_attackers(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1001, "ship_type_id": 22430, "weapon_type_id": 2456, "final_blow": true}
            ]),
        )];

        let (black_ops, _, capital) = analyze(&killmails, &subject());

        assert!(black_ops.detected);
        assert_eq!(black_ops.count, 1);
        assert_eq!(black_ops.unique_ships, 1);
        assert_eq!(black_ops.confidence, Confidence::Low);
        assert!(!capital.detected);
    }

    #[test]
    fn capital_hull_is_detected() {
        // Archon carrier on two kills.
        let killmails: Vec<_> = (0..2)
            .map(|i| {
                killmail_with_attackers(
                    9000 + i,
                    "2026-08-01T12:00:00Z",
                    30000142,
                    json!([
                        {"character_id": 1001, "ship_type_id": 23757, "weapon_type_id": 2456, "final_blow": true}
                    ]),
                )
            })
            .collect();

        let (_, _, capital) = analyze(&killmails, &subject());

        assert!(capital.detected);
        assert_eq!(capital.count, 2);
        assert_eq!(capital.frequency_percent, 100);
    }

    #[test]
    fn single_cyno_stays_undetected() {
        let killmails = vec![killmail_with_attackers(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1001, "ship_type_id": 11957, "weapon_type_id": 21096, "final_blow": false}
            ]),
        )];

        let (_, cyno, _) = analyze(&killmails, &subject());

        assert!(!cyno.detected);
        assert_eq!(cyno.count, 1);
        assert_eq!(cyno.role, None);
    }

    #[test]
    fn repeated_cyno_with_capitals_is_a_hot_drop() {
        let killmails: Vec<_> = (0..2)
            .map(|i| {
                killmail_with_attackers(
                    9000 + i,
                    "2026-08-01T12:00:00Z",
                    30000142,
                    json!([
                        {"character_id": 1001, "ship_type_id": 11957, "weapon_type_id": 21096, "final_blow": false},
                        {"character_id": 1002, "ship_type_id": 23757, "weapon_type_id": 2456, "final_blow": true}
                    ]),
                )
            })
            .collect();

        let (_, cyno, _) = analyze(&killmails, &subject());

        assert!(cyno.detected);
        assert_eq!(cyno.role, Some(CynoRole::HotDrop));
    }

    #[test]
    fn repeated_cyno_without_backup_is_an_alt() {
        let killmails: Vec<_> = (0..2)
            .map(|i| {
                killmail_with_attackers(
                    9000 + i,
                    "2026-08-01T12:00:00Z",
                    30000142,
                    json!([
                        {"character_id": 1001, "ship_type_id": 11957, "weapon_type_id": 21096, "final_blow": false},
                        {"character_id": 1002, "ship_type_id": 621, "weapon_type_id": 2488, "final_blow": true}
                    ]),
                )
            })
            .collect();

        let (_, cyno, _) = analyze(&killmails, &subject());

        assert!(cyno.detected);
        assert_eq!(cyno.role, Some(CynoRole::Alt));
    }

    #[test]
    fn other_characters_rows_are_ignored() {
        let killmails = vec![killmail_with_attackers(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1002, "ship_type_id": 22430, "weapon_type_id": 2456, "final_blow": true}
            ]),
        )];

        let (black_ops, _, _) = analyze(&killmails, &subject());

        assert!(!black_ops.detected);
    }
}
