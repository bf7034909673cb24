//! Fleet size statistics.

use crate::model::analysis::FleetSizeAnalysis;
use crate::model::killmail::FetchedKillmail;

/// Buckets attacker counts per killmail.
///
/// The `large` (26..=40) and `blob` (>30) buckets overlap by design of
/// the classification; both counters tick for a 35-attacker kill.
pub fn analyze(killmails: &[FetchedKillmail]) -> FleetSizeAnalysis {
    if killmails.is_empty() {
        return FleetSizeAnalysis::default();
    }

    let mut result = FleetSizeAnalysis {
        min: usize::MAX,
        ..Default::default()
    };
    let mut total_attackers = 0usize;

    for killmail in killmails {
        let attackers = killmail.killmail.attackers.len();
        total_attackers += attackers;
        result.min = result.min.min(attackers);
        result.max = result.max.max(attackers);

        match attackers {
            1 => result.solo += 1,
            2..=10 => result.small += 1,
            11..=25 => result.medium += 1,
            26..=40 => result.large += 1,
            _ => {}
        }
        if attackers > 30 {
            result.blob += 1;
        }
    }

    result.avg = total_attackers as f64 / killmails.len() as f64;

    result
}
