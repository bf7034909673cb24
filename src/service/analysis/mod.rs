//! Killmail activity analysis.
//!
//! A deterministic aggregation pass over fetched killmails. Every
//! submodule is a pure function of its inputs; the entry point here just
//! fans the killmail slice out to them and assembles the result.

mod activity;
mod capabilities;
mod engagement;
mod fleet;
mod hvt;
mod ships;
mod targets;

use crate::model::analysis::ActivityAnalysis;
use crate::model::entity::EntityKind;
use crate::model::killmail::{Attacker, FetchedKillmail};

/// Picks which attacker rows represent the analyzed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubjectFilter {
    pub kind: EntityKind,
    pub id: i64,
}

impl SubjectFilter {
    pub fn matches(&self, attacker: &Attacker) -> bool {
        match self.kind {
            EntityKind::Character => attacker.character_id == Some(self.id),
            EntityKind::Corporation => attacker.corporation_id == Some(self.id),
            EntityKind::Alliance => attacker.alliance_id == Some(self.id),
        }
    }
}

/// Aggregates one entity's killmails into an [`ActivityAnalysis`].
pub fn analyze_killmails(killmails: &[FetchedKillmail], subject: &SubjectFilter) -> ActivityAnalysis {
    let total_killmails = killmails.len();
    let most_expensive_kill = killmails
        .iter()
        .map(|k| k.zkb.total_value)
        .fold(0.0_f64, f64::max);
    let avg_value = if total_killmails > 0 {
        killmails.iter().map(|k| k.zkb.total_value).sum::<f64>() / total_killmails as f64
    } else {
        0.0
    };

    let (ship_composition, weapon_preferences) = ships::analyze(killmails, subject);
    let (black_ops, cyno, capital) = capabilities::analyze(killmails, subject);

    ActivityAnalysis {
        total_killmails,
        most_expensive_kill,
        avg_value,
        fleet_size: fleet::analyze(killmails),
        ship_composition,
        weapon_preferences,
        time_analysis: activity::time_histogram(killmails),
        solo_vs_fleet: activity::solo_vs_fleet(killmails),
        hvt: hvt::analyze(killmails),
        target_preferences: targets::analyze(killmails),
        engagement: engagement::analyze(killmails),
        black_ops,
        cyno,
        capital,
    }
}
