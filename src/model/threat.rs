//! Threat scoring output and killboard summary statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Killboard summary statistics derived from the fetched feed, consumed
/// by the threat scorer alongside the activity analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KillboardStats {
    /// Total kill references returned by the feed.
    pub total_kills: usize,
    /// Killmails actually analyzed (bounded by the fetch limit).
    pub analyzed_killmails: usize,
    pub solo_kills: usize,
    pub solo_ratio_percent: u32,
    pub gang_ratio_percent: u32,
    pub isk_destroyed: f64,
    /// Share of kills flown in combat hulls rather than industrials.
    pub danger_ratio_percent: u32,
    pub space_preference: SpacePreference,
    /// Kills per day inside the recent scoring window.
    pub recent_kills_per_day: f64,
    pub last_kill_time: Option<DateTime<Utc>>,
}

/// Integer percentages per security class; sums to 100 when any killmail
/// was analyzed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacePreference {
    pub highsec: u32,
    pub lowsec: u32,
    pub nullsec: u32,
    pub wormhole: u32,
    pub pochven: u32,
}

/// Textual risk band derived from the final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
    Extreme,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Minimal => "Minimal",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Severe => "Severe",
            Self::Extreme => "Extreme",
        };
        f.write_str(label)
    }
}

/// Short labels surfaced next to the score, at most three, in priority
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatTag {
    #[serde(rename = "ACTIVE NOW")]
    ActiveNow,
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "HVT Hunter")]
    HvtHunter,
    #[serde(rename = "Blops")]
    Blops,
    #[serde(rename = "Cyno")]
    Cyno,
    #[serde(rename = "Solo Hunter")]
    SoloHunter,
    #[serde(rename = "Small Gang")]
    SmallGang,
    #[serde(rename = "Fleet Fighter")]
    FleetFighter,
    #[serde(rename = "Blob")]
    Blob,
    #[serde(rename = "Gate Camper")]
    GateCamper,
    #[serde(rename = "Capital")]
    Capital,
}

/// Per-dimension scores, each in 0..=100, prior to weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub recency: u32,
    pub frequency: u32,
    pub hvt: u32,
    pub ship_capability: u32,
    pub security: u32,
    pub solo: u32,
}

/// Final threat assessment for one entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreatAssessment {
    /// Weighted score, clamped to 0..=110 (base 100 plus capital bonus).
    pub score: u32,
    pub risk_level: RiskLevel,
    pub tags: Vec<ThreatTag>,
    pub components: ComponentScores,
    /// Hours since the most recent kill, if any kill was observed.
    pub last_kill_age_hours: Option<f64>,
}
