//! Killboard summary statistics.
//!
//! Derives the scorer's inputs from the fetched feed: totals, solo and
//! gang ratios, ISK destroyed, the danger ratio, security-space
//! preference, and recency figures. Space classification resolves each
//! solar system through the universe cache; a system that could not be
//! resolved is counted as nullsec, the most common unresolvable case.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::killmail::{FetchedKillmail, KillRef};
use crate::model::threat::{KillboardStats, SpacePreference};
use crate::reference::{class_of_type, is_pochven_system};
use crate::service::analysis::SubjectFilter;
use crate::service::universe::SystemInfo;
use crate::util::math::largest_remainder_percentages;

/// Security status at or above which a system is highsec.
const HIGHSEC_FLOOR: f64 = 0.45;
/// Solar system ids in this range are wormhole space.
const WORMHOLE_RANGE: std::ops::Range<i64> = 31_000_000..32_000_000;

pub fn build_killboard_stats(
    kills: &[KillRef],
    killmails: &[FetchedKillmail],
    subject: &SubjectFilter,
    systems: &HashMap<i64, SystemInfo>,
    now: DateTime<Utc>,
    recent_window_days: i64,
) -> KillboardStats {
    let analyzed = killmails.len();

    let solo_kills = killmails
        .iter()
        .filter(|k| k.killmail.attackers.len() == 1)
        .count();
    let solo_ratio_percent = percent(solo_kills, analyzed);
    let gang_ratio_percent = if analyzed > 0 {
        100 - solo_ratio_percent
    } else {
        0
    };

    let isk_destroyed = killmails.iter().map(|k| k.zkb.total_value).sum();

    KillboardStats {
        total_kills: kills.len(),
        analyzed_killmails: analyzed,
        solo_kills,
        solo_ratio_percent,
        gang_ratio_percent,
        isk_destroyed,
        danger_ratio_percent: danger_ratio(killmails, subject),
        space_preference: space_preference(killmails, systems),
        recent_kills_per_day: recent_rate(killmails, now, recent_window_days),
        last_kill_time: killmails.iter().map(|k| k.killmail.killmail_time).max(),
    }
}

/// Share of kills on which the subject flew a combat hull. Unclassified
/// hulls count as combat; industrial and mining hulls do not.
fn danger_ratio(killmails: &[FetchedKillmail], subject: &SubjectFilter) -> u32 {
    if killmails.is_empty() {
        return 0;
    }

    let dangerous = killmails
        .iter()
        .filter(|killmail| {
            killmail
                .killmail
                .attackers
                .iter()
                .filter(|attacker| subject.matches(attacker))
                .any(|attacker| {
                    attacker
                        .ship_type_id
                        .and_then(class_of_type)
                        .map(|class| !class.is_industrial())
                        .unwrap_or(true)
                })
        })
        .count();

    percent(dangerous, killmails.len())
}

fn space_preference(
    killmails: &[FetchedKillmail],
    systems: &HashMap<i64, SystemInfo>,
) -> SpacePreference {
    let mut highsec = 0usize;
    let mut lowsec = 0usize;
    let mut nullsec = 0usize;
    let mut wormhole = 0usize;
    let mut pochven = 0usize;

    for killmail in killmails {
        let system_id = killmail.killmail.solar_system_id;

        if WORMHOLE_RANGE.contains(&system_id) {
            wormhole += 1;
        } else if is_pochven_system(system_id) {
            pochven += 1;
        } else {
            match systems.get(&system_id) {
                Some(info) if info.security_status >= HIGHSEC_FLOOR => highsec += 1,
                Some(info) if info.security_status > 0.0 => lowsec += 1,
                _ => nullsec += 1,
            }
        }
    }

    let percentages =
        largest_remainder_percentages(&[highsec, lowsec, nullsec, wormhole, pochven]);

    SpacePreference {
        highsec: percentages[0],
        lowsec: percentages[1],
        nullsec: percentages[2],
        wormhole: percentages[3],
        pochven: percentages[4],
    }
}

fn recent_rate(killmails: &[FetchedKillmail], now: DateTime<Utc>, window_days: i64) -> f64 {
    if window_days <= 0 {
        return 0.0;
    }

    let cutoff = now - Duration::days(window_days);
    let recent = killmails
        .iter()
        .filter(|k| k.killmail.killmail_time >= cutoff)
        .count();

    recent as f64 / window_days as f64
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 100) as f64 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crate::util::test::{fetched_killmail, kill_ref};

    use crate::model::entity::EntityKind;

    use super::*;

    fn subject() -> SubjectFilter {
        SubjectFilter {
            kind: EntityKind::Character,
            id: 1001,
        }
    }

    fn system(id: i64, security: f64) -> (i64, SystemInfo) {
        (
            id,
            SystemInfo {
                system_id: id,
                name: format!("System {id}"),
                security_status: security,
            },
        )
    }

    #[test]
    fn solo_and_gang_ratios_complement() {
        let killmails = vec![
            fetched_killmail(9000, "2026-08-01T12:00:00Z", 30000142, 1001, 1),
            fetched_killmail(9001, "2026-08-01T13:00:00Z", 30000142, 1001, 5),
        ];
        let kills = vec![kill_ref(9000, "a", 0.0), kill_ref(9001, "b", 0.0)];
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();

        let stats = build_killboard_stats(
            &kills,
            &killmails,
            &subject(),
            &HashMap::new(),
            now,
            30,
        );

        assert_eq!(stats.total_kills, 2);
        assert_eq!(stats.solo_kills, 1);
        assert_eq!(stats.solo_ratio_percent, 50);
        assert_eq!(stats.gang_ratio_percent, 50);
    }

    #[test]
    fn space_preference_classifies_by_security_and_region() {
        let killmails = vec![
            fetched_killmail(9000, "2026-08-01T12:00:00Z", 30000142, 1001, 1), // highsec
            fetched_killmail(9001, "2026-08-01T13:00:00Z", 30002813, 1001, 1), // lowsec
            fetched_killmail(9002, "2026-08-01T14:00:00Z", 30004759, 1001, 1), // nullsec
            fetched_killmail(9003, "2026-08-01T15:00:00Z", 31000005, 1001, 1), // wormhole
        ];
        let systems: HashMap<i64, SystemInfo> = [
            system(30000142, 0.945),
            system(30002813, 0.3),
            system(30004759, -0.2),
        ]
        .into_iter()
        .collect();
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();

        let stats = build_killboard_stats(&[], &killmails, &subject(), &systems, now, 30);

        assert_eq!(stats.space_preference.highsec, 25);
        assert_eq!(stats.space_preference.lowsec, 25);
        assert_eq!(stats.space_preference.nullsec, 25);
        assert_eq!(stats.space_preference.wormhole, 25);
        assert_eq!(stats.space_preference.pochven, 0);
    }

    #[test]
    fn unresolved_system_counts_as_nullsec() {
        let killmails = vec![fetched_killmail(9000, "2026-08-01T12:00:00Z", 30009999, 1001, 1)];
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();

        let stats = build_killboard_stats(&[], &killmails, &subject(), &HashMap::new(), now, 30);

        assert_eq!(stats.space_preference.nullsec, 100);
    }

    #[test]
    fn recent_rate_counts_only_the_window() {
        let killmails = vec![
            fetched_killmail(9000, "2026-08-01T12:00:00Z", 30000142, 1001, 1),
            fetched_killmail(9001, "2026-06-01T12:00:00Z", 30000142, 1001, 1),
        ];
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();

        let stats = build_killboard_stats(&[], &killmails, &subject(), &HashMap::new(), now, 30);

        assert!((stats.recent_kills_per_day - 1.0 / 30.0).abs() < 1e-9);
        assert_eq!(
            stats.last_kill_time,
            Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap())
        );
    }
}
