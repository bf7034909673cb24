//! Ship composition and weapon preferences.

use std::collections::HashMap;

use crate::model::analysis::{RankedType, ShipComposition, WeaponPreferences};
use crate::model::killmail::FetchedKillmail;

use super::SubjectFilter;

const TOP_N: usize = 10;

/// Counts the hulls and weapons the subject brought to its kills.
pub fn analyze(
    killmails: &[FetchedKillmail],
    subject: &SubjectFilter,
) -> (ShipComposition, WeaponPreferences) {
    let mut ships: HashMap<i64, usize> = HashMap::new();
    let mut weapons: HashMap<i64, usize> = HashMap::new();

    for killmail in killmails {
        for attacker in &killmail.killmail.attackers {
            if !subject.matches(attacker) {
                continue;
            }

            if let Some(ship) = attacker.ship_type_id {
                *ships.entry(ship).or_default() += 1;
            }

            // A weapon id equal to the ship id means "the hull itself"
            // (drones, rams); it says nothing about fitted weapons.
            if let Some(weapon) = attacker.weapon_type_id {
                if attacker.ship_type_id != Some(weapon) {
                    *weapons.entry(weapon).or_default() += 1;
                }
            }
        }
    }

    let composition = ShipComposition {
        unique_ships: ships.len(),
        top_ships: ranked(ships),
    };
    let preferences = WeaponPreferences {
        unique_weapons: weapons.len(),
        top_weapons: ranked(weapons),
    };

    (composition, preferences)
}

fn ranked(counts: HashMap<i64, usize>) -> Vec<RankedType> {
    let mut entries: Vec<RankedType> = counts
        .into_iter()
        .map(|(type_id, count)| RankedType { type_id, count })
        .collect();

    // Count descending, type id ascending for a stable order on ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.type_id.cmp(&b.type_id)));
    entries.truncate(TOP_N);

    entries
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
    fn counts_only_subject_rows() {
        let killmails = vec![killmail_with_attackers(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1001, "ship_type_id": 587, "weapon_type_id": 2456, "final_blow": true},
                {"character_id": 1002, "ship_type_id": 621, "weapon_type_id": 2488}
            ]),
        )];

        let (composition, preferences) = analyze(&killmails, &subject());

        assert_eq!(composition.unique_ships, 1);
        assert_eq!(composition.top_ships[0].type_id, 587);
        assert_eq!(preferences.top_weapons[0].type_id, 2456);
    }

    #[test]
    fn weapon_equal_to_ship_is_excluded() {
        let killmails = vec![killmail_with_attackers(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1001, "ship_type_id": 587, "weapon_type_id": 587, "final_blow": true}
            ]),
        )];

        let (composition, preferences) = analyze(&killmails, &subject());

        assert_eq!(composition.unique_ships, 1);
        assert!(preferences.top_weapons.is_empty());
        assert_eq!(preferences.unique_weapons, 0);
    }

    #[test]
    fn ranking_is_by_count_descending() {
        let mut killmails = Vec::new();
        for i in 0..3 {
            killmails.push(killmail_with_attackers(
                9000 + i,
                "2026-08-01T12:00:00Z",
                30000142,
                json!([
                    {"character_id": 1001, "ship_type_id": 587, "weapon_type_id": 2456, "final_blow": true}
                ]),
            ));
        }
        killmails.push(killmail_with_attackers(
            9100,
            "2026-08-01T12:00:00Z",
            30000142,
            json!([
                {"character_id": 1001, "ship_type_id": 621, "weapon_type_id": 2488, "final_blow": true}
            ]),
        ));

        let (composition, _) = analyze(&killmails, &subject());

        assert_eq!(composition.top_ships[0], RankedType { type_id: 587, count: 3 });
        assert_eq!(composition.top_ships[1], RankedType { type_id: 621, count: 1 });
    }
}
