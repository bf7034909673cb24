//! Aggregated killmail activity analysis.
//!
//! Every percentage in this module is an integer; groups that must sum to
//! 100 are produced with largest-remainder rounding.

use serde::{Deserialize, Serialize};

use crate::reference::ShipSize;

/// Confidence band derived from sample size and detection counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Complete analyzer output over one entity's killmails.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityAnalysis {
    pub total_killmails: usize,
    pub most_expensive_kill: f64,
    pub avg_value: f64,
    pub fleet_size: FleetSizeAnalysis,
    pub ship_composition: ShipComposition,
    pub weapon_preferences: WeaponPreferences,
    pub time_analysis: TimeAnalysis,
    pub solo_vs_fleet: SoloVsFleet,
    pub hvt: HvtAnalysis,
    pub target_preferences: TargetPreferences,
    pub engagement: EngagementPatterns,
    pub black_ops: CapabilityAnalysis,
    pub cyno: CynoAnalysis,
    pub capital: CapabilityAnalysis,
}

/// Attacker-count statistics with bucketed fleet sizes.
///
/// The `large` (26..=40) and `blob` (>30) buckets overlap; a 35-attacker
/// kill counts in both. Consumers treat them as independent signals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSizeAnalysis {
    pub avg: f64,
    pub min: usize,
    pub max: usize,
    pub solo: usize,
    pub small: usize,
    pub medium: usize,
    pub large: usize,
    pub blob: usize,
}

/// A ship or weapon type with its occurrence count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedType {
    pub type_id: i64,
    pub count: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShipComposition {
    /// Top 10 attacker ship types by frequency.
    pub top_ships: Vec<RankedType>,
    pub unique_ships: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeaponPreferences {
    /// Top 10 weapon types, excluding rows where the weapon is the ship.
    pub top_weapons: Vec<RankedType>,
    pub unique_weapons: usize,
}

/// UTC-hour activity histogram.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeAnalysis {
    pub hourly: Vec<usize>,
    pub peak_hour: Option<u32>,
    /// Least active hour that still saw at least one kill.
    pub quietest_hour: Option<u32>,
}

/// A count with its integer share of the total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCount {
    pub count: usize,
    pub percentage: u32,
}

/// Solo / small gang / fleet split. The three percentages always sum to
/// exactly 100 when any killmail exists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SoloVsFleet {
    pub solo: ShareCount,
    pub small_gang: ShareCount,
    pub fleet: ShareCount,
}

/// How evenly spaced an entity's high-value kills are over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSpread {
    Frequent,
    Regular,
    Occasional,
    Sporadic,
}

/// High-value-target hunting profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HvtAnalysis {
    /// Kills above 500M ISK.
    pub high: usize,
    /// Kills above 1B ISK.
    pub very_high: usize,
    /// Kills above 5B ISK.
    pub extreme: usize,
    pub total_hvt: usize,
    pub frequency_percent: u32,
    pub avg_hvt_value: f64,
    /// Mean HVT value relative to the mean non-HVT value.
    pub value_ratio: f64,
    pub time_spread: TimeSpread,
    pub confidence: Confidence,
    pub is_hvt_hunter: bool,
}

/// Victim ship-size preference.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TargetPreferences {
    pub ship_sizes: Vec<SizeShare>,
    pub industrial_hunter: bool,
    pub capital_hunter: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeShare {
    pub size: ShipSize,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementStyle {
    #[serde(rename = "Gate Camp")]
    GateCamp,
    Territorial,
    Roaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPace {
    Rapid,
    Active,
    Moderate,
    Sporadic,
}

/// Geographic and temporal engagement profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngagementPatterns {
    /// Share of kills in the single most active system, 0.0..=1.0.
    pub system_concentration: f64,
    pub top_system_id: Option<i64>,
    pub style: EngagementStyle,
    pub avg_gap_minutes: f64,
    pub pace: ActivityPace,
}

/// Detection result for a ship-class capability (black ops, capital).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityAnalysis {
    pub detected: bool,
    pub confidence: Confidence,
    pub count: usize,
    pub frequency_percent: u32,
    pub unique_ships: usize,
    pub sample_size: usize,
}

impl CapabilityAnalysis {
    pub fn absent(sample_size: usize) -> Self {
        Self {
            detected: false,
            confidence: Confidence::Low,
            count: 0,
            frequency_percent: 0,
            unique_ships: 0,
            sample_size,
        }
    }
}

/// How an entity employs cynosural fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CynoRole {
    #[serde(rename = "Hot Drop Cyno")]
    HotDrop,
    #[serde(rename = "Cyno Alt")]
    Alt,
}

/// Cyno detection with its usage classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CynoAnalysis {
    pub detected: bool,
    pub confidence: Confidence,
    pub count: usize,
    pub frequency_percent: u32,
    pub unique_ships: usize,
    pub sample_size: usize,
    pub role: Option<CynoRole>,
}
