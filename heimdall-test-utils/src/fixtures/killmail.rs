//! ESI-shaped killmail body builders for mock endpoints.
//!
//! Attacker row zero is always the "subject" character so tests can
//! filter on it; further rows use distinct character ids and a cruiser
//! hull.

use serde_json::{json, Value};

/// Default subject hull: Rifter (combat frigate).
pub const SUBJECT_SHIP: i64 = 587;
/// Default weapon fitted on the subject's hull.
pub const SUBJECT_WEAPON: i64 = 2456;
/// Default victim hull: Caracal (cruiser).
pub const VICTIM_SHIP: i64 = 621;

/// Full killmail body as returned by `GET /killmails/{id}/{hash}/`.
pub fn killmail_json(
    killmail_id: i64,
    killmail_time: &str,
    solar_system_id: i64,
    subject_character_id: i64,
    attackers: usize,
) -> Value {
    let attacker_rows: Vec<Value> = (0..attackers.max(1))
        .map(|i| {
            if i == 0 {
                json!({
                    "character_id": subject_character_id,
                    "corporation_id": 2001,
                    "ship_type_id": SUBJECT_SHIP,
                    "weapon_type_id": SUBJECT_WEAPON,
                    "final_blow": true
                })
            } else {
                json!({
                    "character_id": 5000 + i as i64,
                    "corporation_id": 2002,
                    "ship_type_id": VICTIM_SHIP,
                    "weapon_type_id": 2488,
                    "final_blow": false
                })
            }
        })
        .collect();

    killmail_json_with_attackers(
        killmail_id,
        killmail_time,
        solar_system_id,
        Value::Array(attacker_rows),
    )
}

/// Killmail body with fully caller-specified attacker rows.
pub fn killmail_json_with_attackers(
    killmail_id: i64,
    killmail_time: &str,
    solar_system_id: i64,
    attackers: Value,
) -> Value {
    json!({
        "killmail_id": killmail_id,
        "killmail_time": killmail_time,
        "solar_system_id": solar_system_id,
        "victim": {
            "ship_type_id": VICTIM_SHIP,
            "character_id": 9999,
            "corporation_id": 2999
        },
        "attackers": attackers
    })
}

/// One zKill feed entry.
pub fn kill_ref_json(killmail_id: i64, hash: &str, total_value: f64) -> Value {
    json!({
        "killmail_id": killmail_id,
        "zkb": {"hash": hash, "totalValue": total_value}
    })
}
