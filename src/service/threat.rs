//! Threat scoring.
//!
//! Combines the killboard summary and the activity analysis into a
//! single score with a risk band and up to three tags. Component scores
//! live in 0..=100 and are blended with fixed weights; the blended score
//! then takes fleet-role adjustments and a capital bonus, ending clamped
//! to 0..=110.

use chrono::{DateTime, Utc};

use crate::model::analysis::{ActivityAnalysis, Confidence, EngagementStyle};
use crate::model::threat::{
    ComponentScores, KillboardStats, RiskLevel, ThreatAssessment, ThreatTag,
};

/// Component weights; they sum to 1.0.
const WEIGHT_RECENCY: f64 = 0.25;
const WEIGHT_FREQUENCY: f64 = 0.20;
const WEIGHT_HVT: f64 = 0.15;
const WEIGHT_CAPABILITY: f64 = 0.15;
const WEIGHT_SECURITY: f64 = 0.10;
const WEIGHT_SOLO: f64 = 0.15;

/// Score deduction for pilots who only appear in blobs.
const BLOBBER_PENALTY: i64 = 15;
/// Score deduction for dedicated fleet fighters.
const FLEET_FIGHTER_PENALTY: i64 = 10;
/// Bonus for demonstrated capital capability, on top of the 100 base.
const CAPITAL_BONUS: i64 = 10;

/// Maximum achievable score: the weighted base plus the capital bonus.
const MAX_SCORE: i64 = 110;

/// Fleet engagement role derived from the solo/fleet split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FleetRole {
    SoloHunter,
    SmallGang,
    FleetFighter,
    Blobber,
    Mixed,
}

pub fn assess_threat(
    stats: &KillboardStats,
    analysis: &ActivityAnalysis,
    now: DateTime<Utc>,
) -> ThreatAssessment {
    let last_kill_age_hours = stats
        .last_kill_time
        .map(|time| (now - time).num_seconds() as f64 / 3600.0);

    let components = ComponentScores {
        recency: recency_score(last_kill_age_hours),
        frequency: frequency_score(stats.total_kills, stats.recent_kills_per_day),
        hvt: hvt_score(analysis),
        ship_capability: capability_score(analysis),
        security: security_score(stats),
        solo: solo_score(stats),
    };

    let weighted = components.recency as f64 * WEIGHT_RECENCY
        + components.frequency as f64 * WEIGHT_FREQUENCY
        + components.hvt as f64 * WEIGHT_HVT
        + components.ship_capability as f64 * WEIGHT_CAPABILITY
        + components.security as f64 * WEIGHT_SECURITY
        + components.solo as f64 * WEIGHT_SOLO;

    let mut score = weighted.round() as i64;

    match fleet_role(analysis) {
        FleetRole::Blobber => score -= BLOBBER_PENALTY,
        FleetRole::FleetFighter => score -= FLEET_FIGHTER_PENALTY,
        _ => {}
    }

    if analysis.capital.detected {
        score += CAPITAL_BONUS;
    }

    let score = score.clamp(0, MAX_SCORE) as u32;

    ThreatAssessment {
        score,
        risk_level: risk_level(score),
        tags: tags(analysis, last_kill_age_hours),
        components,
        last_kill_age_hours,
    }
}

/// Step function over the age of the most recent kill.
fn recency_score(last_kill_age_hours: Option<f64>) -> u32 {
    let Some(age_hours) = last_kill_age_hours else {
        return 0;
    };

    match age_hours {
        a if a < 1.0 => 100,
        a if a < 6.0 => 90,
        a if a < 24.0 => 80,
        a if a < 72.0 => 65,
        a if a < 168.0 => 50,
        a if a < 720.0 => 30,
        a if a < 2160.0 => 15,
        _ => 5,
    }
}

/// Step function over total kills plus a small bonus for the observed
/// kills-per-day rate in the recent window.
fn frequency_score(total_kills: usize, recent_kills_per_day: f64) -> u32 {
    let base: u32 = match total_kills {
        0 => 0,
        1..=9 => 15,
        10..=49 => 35,
        50..=199 => 55,
        200..=499 => 70,
        500..=999 => 85,
        _ => 95,
    };

    let bonus: u32 = match recent_kills_per_day {
        r if r >= 5.0 => 5,
        r if r >= 1.0 => 3,
        r if r > 0.0 => 1,
        _ => 0,
    };

    (base + bonus).min(100)
}

/// Zero unless the entity hunts high-value targets; otherwise the mean
/// of the HVT frequency and a count-normalized score, scaled by the
/// detection confidence.
fn hvt_score(analysis: &ActivityAnalysis) -> u32 {
    if !analysis.hvt.is_hvt_hunter {
        return 0;
    }

    let count_score = ((analysis.hvt.total_hvt * 5) as f64).min(100.0);
    let base = (analysis.hvt.frequency_percent as f64 + count_score) / 2.0;
    let scaled = base * confidence_multiplier(analysis.hvt.confidence);

    (scaled.round() as u32).min(100)
}

/// Additive over black ops, cyno, and capital capability.
fn capability_score(analysis: &ActivityAnalysis) -> u32 {
    let mut score = 0u32;

    if analysis.black_ops.detected {
        score += match analysis.black_ops.confidence {
            Confidence::High => 50,
            Confidence::Medium => 35,
            Confidence::Low => 20,
        };
    }

    if analysis.cyno.detected {
        score += match analysis.cyno.confidence {
            Confidence::High => 30,
            Confidence::Medium => 20,
            Confidence::Low => 10,
        };
    }

    if analysis.capital.detected {
        score += 30;
    }

    score.min(100)
}

/// Weighted sum over the space-preference percentages. Hunting grounds
/// rank by how dangerous an encounter there is: wormhole space first,
/// then nullsec, lowsec, Pochven, and highsec.
fn security_score(stats: &KillboardStats) -> u32 {
    let prefs = &stats.space_preference;
    let weighted = prefs.wormhole as f64 * 1.0
        + prefs.nullsec as f64 * 0.8
        + prefs.lowsec as f64 * 0.6
        + prefs.pochven as f64 * 0.5
        + prefs.highsec as f64 * 0.2;

    (weighted.round() as u32).min(100)
}

/// Step over the solo ratio with bonuses for gang ratio and danger
/// ratio.
fn solo_score(stats: &KillboardStats) -> u32 {
    let base: u32 = match stats.solo_ratio_percent {
        r if r >= 80 => 90,
        r if r >= 60 => 75,
        r if r >= 40 => 60,
        r if r >= 20 => 40,
        r if r > 0 => 20,
        _ => 10,
    };

    let gang_bonus: u32 = if stats.gang_ratio_percent >= 90 { 5 } else { 0 };
    let danger_bonus: u32 = if stats.danger_ratio_percent >= 80 { 5 } else { 0 };

    (base + gang_bonus + danger_bonus).min(100)
}

fn confidence_multiplier(confidence: Confidence) -> f64 {
    match confidence {
        Confidence::High => 1.0,
        Confidence::Medium => 0.8,
        Confidence::Low => 0.6,
    }
}

fn fleet_role(analysis: &ActivityAnalysis) -> FleetRole {
    let split = &analysis.solo_vs_fleet;
    let total = analysis.total_killmails;

    // A quarter of kills in 30+ fleets marks a blobber before the
    // broader fleet-fighter read.
    if total > 0 && analysis.fleet_size.blob * 4 >= total {
        return FleetRole::Blobber;
    }
    if split.fleet.percentage >= 50 {
        return FleetRole::FleetFighter;
    }
    if split.solo.percentage >= 50 {
        return FleetRole::SoloHunter;
    }
    if split.small_gang.percentage >= 50 {
        return FleetRole::SmallGang;
    }

    FleetRole::Mixed
}

fn risk_level(score: u32) -> RiskLevel {
    match score {
        s if s >= 90 => RiskLevel::Extreme,
        s if s >= 75 => RiskLevel::Severe,
        s if s >= 60 => RiskLevel::High,
        s if s >= 40 => RiskLevel::Moderate,
        s if s >= 20 => RiskLevel::Low,
        _ => RiskLevel::Minimal,
    }
}

/// Up to three tags in priority order.
fn tags(analysis: &ActivityAnalysis, last_kill_age_hours: Option<f64>) -> Vec<ThreatTag> {
    let mut tags = Vec::new();

    match last_kill_age_hours {
        Some(age) if age < 24.0 => tags.push(ThreatTag::ActiveNow),
        Some(age) if age < 168.0 => tags.push(ThreatTag::Active),
        _ => {}
    }

    if analysis.hvt.is_hvt_hunter {
        tags.push(ThreatTag::HvtHunter);
    }
    if analysis.black_ops.detected {
        tags.push(ThreatTag::Blops);
    }
    if analysis.cyno.detected {
        tags.push(ThreatTag::Cyno);
    }

    match fleet_role(analysis) {
        FleetRole::SoloHunter => tags.push(ThreatTag::SoloHunter),
        FleetRole::SmallGang => tags.push(ThreatTag::SmallGang),
        FleetRole::FleetFighter => tags.push(ThreatTag::FleetFighter),
        FleetRole::Blobber => tags.push(ThreatTag::Blob),
        FleetRole::Mixed => {}
    }

    if analysis.engagement.style == EngagementStyle::GateCamp {
        tags.push(ThreatTag::GateCamper);
    }
    if analysis.capital.detected {
        tags.push(ThreatTag::Capital);
    }

    tags.truncate(3);

    tags
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crate::util::test::{fetched_killmail, fetched_killmail_valued};

    use crate::model::entity::EntityKind;
    use crate::model::threat::SpacePreference;
    use crate::service::analysis::{analyze_killmails, SubjectFilter};

    use super::*;

    fn subject() -> SubjectFilter {
        SubjectFilter {
            kind: EntityKind::Character,
            id: 1001,
        }
    }

    fn stats_with(
        last_kill_time: Option<DateTime<Utc>>,
        solo_ratio_percent: u32,
        total_kills: usize,
    ) -> KillboardStats {
        KillboardStats {
            total_kills,
            analyzed_killmails: total_kills,
            solo_kills: 0,
            solo_ratio_percent,
            gang_ratio_percent: 100 - solo_ratio_percent,
            isk_destroyed: 0.0,
            danger_ratio_percent: 100,
            space_preference: SpacePreference {
                nullsec: 100,
                ..Default::default()
            },
            recent_kills_per_day: 1.5,
            last_kill_time,
        }
    }

    #[test]
    fn fresh_kills_score_high_on_recency() {
        assert_eq!(recency_score(Some(0.5)), 100);
        assert_eq!(recency_score(Some(100.0)), 50);
        assert_eq!(recency_score(None), 0);
    }

    #[test]
    fn score_is_clamped_to_range() {
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();
        let killmails = vec![fetched_killmail(9000, "2026-08-01T23:30:00Z", 30000142, 1001, 1)];
        let analysis = analyze_killmails(&killmails, &subject());
        let stats = stats_with(Some(now - chrono::Duration::minutes(30)), 100, 1);

        let assessment = assess_threat(&stats, &analysis, now);

        assert!(assessment.score <= 110);
        assert!(assessment.tags.len() <= 3);
        assert_eq!(assessment.tags[0], ThreatTag::ActiveNow);
    }

    #[test]
    fn inactive_entity_scores_minimal() {
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();
        let analysis = analyze_killmails(&[], &subject());
        let stats = KillboardStats {
            total_kills: 0,
            analyzed_killmails: 0,
            solo_kills: 0,
            solo_ratio_percent: 0,
            gang_ratio_percent: 0,
            isk_destroyed: 0.0,
            danger_ratio_percent: 0,
            space_preference: SpacePreference::default(),
            recent_kills_per_day: 0.0,
            last_kill_time: None,
        };

        let assessment = assess_threat(&stats, &analysis, now);

        assert_eq!(assessment.components.recency, 0);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
        assert!(assessment.last_kill_age_hours.is_none());
    }

    #[test]
    fn hvt_component_is_zero_for_non_hunters() {
        let killmails = vec![fetched_killmail_valued(
            9000,
            "2026-08-01T12:00:00Z",
            30000142,
            1001,
            1,
            1_000_000.0,
        )];
        let analysis = analyze_killmails(&killmails, &subject());

        assert_eq!(hvt_score(&analysis), 0);
    }

    #[test]
    fn hvt_hunter_gets_a_component_score() {
        let killmails: Vec<_> = (0..10)
            .map(|i| {
                fetched_killmail_valued(
                    9000 + i,
                    "2026-08-01T12:00:00Z",
                    30000142,
                    1001,
                    1,
                    2_000_000_000.0,
                )
            })
            .collect();
        let analysis = analyze_killmails(&killmails, &subject());

        assert!(analysis.hvt.is_hvt_hunter);
        assert!(hvt_score(&analysis) > 0);
    }

    #[test]
    fn wormhole_hunters_outrank_highsec_gankers_on_security() {
        let wormhole = KillboardStats {
            space_preference: SpacePreference {
                wormhole: 100,
                ..Default::default()
            },
            ..stats_with(None, 0, 0)
        };
        let highsec = KillboardStats {
            space_preference: SpacePreference {
                highsec: 100,
                ..Default::default()
            },
            ..stats_with(None, 0, 0)
        };

        assert!(security_score(&wormhole) > security_score(&highsec));
        assert_eq!(security_score(&wormhole), 100);
        assert_eq!(security_score(&highsec), 20);
    }

    #[test]
    fn fleet_fighters_take_a_penalty() {
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap();
        // All kills in 15-attacker fleets.
        let fleet_kills: Vec<_> = (0..4)
            .map(|i| fetched_killmail(9000 + i, "2026-08-01T12:00:00Z", 30000142, 1001, 15))
            .collect();
        let solo_kills: Vec<_> = (0..4)
            .map(|i| fetched_killmail(9000 + i, "2026-08-01T12:00:00Z", 30000142, 1001, 1))
            .collect();

        let fleet_analysis = analyze_killmails(&fleet_kills, &subject());
        let solo_analysis = analyze_killmails(&solo_kills, &subject());
        let stats = stats_with(Some(now - chrono::Duration::hours(2)), 50, 4);

        let fleet_assessment = assess_threat(&stats, &fleet_analysis, now);
        let solo_assessment = assess_threat(&stats, &solo_analysis, now);

        assert!(fleet_assessment.score < solo_assessment.score);
    }

    #[test]
    fn risk_bands_cover_the_score_range() {
        assert_eq!(risk_level(0), RiskLevel::Minimal);
        assert_eq!(risk_level(25), RiskLevel::Low);
        assert_eq!(risk_level(45), RiskLevel::Moderate);
        assert_eq!(risk_level(65), RiskLevel::High);
        assert_eq!(risk_level(80), RiskLevel::Severe);
        assert_eq!(risk_level(110), RiskLevel::Extreme);
    }
}
