//! Killboard wire shapes: feed references and full killmail bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a zKill feed page: the killmail id plus killboard
/// metadata. Killmail ids are monotonic, so a larger id is later in time;
/// the paginator leans on that for its timespan estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KillRef {
    pub killmail_id: i64,
    pub zkb: ZkbMeta,
}

/// zKill metadata attached to each kill reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZkbMeta {
    /// Hash required to fetch the full body from ESI.
    pub hash: String,
    #[serde(rename = "totalValue", default)]
    pub total_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solo: Option<bool>,
}

/// Full killmail body from `GET /killmails/{id}/{hash}/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KillmailFull {
    pub killmail_id: i64,
    pub killmail_time: DateTime<Utc>,
    pub solar_system_id: i64,
    pub victim: Victim,
    pub attackers: Vec<Attacker>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Victim {
    pub ship_type_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attacker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_type_id: Option<i64>,
    #[serde(default)]
    pub final_blow: bool,
}

/// A kill reference joined with its fetched body, as produced by the
/// killmail fetcher (from cache or upstream).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchedKillmail {
    pub killmail_id: i64,
    pub hash: String,
    pub zkb: ZkbMeta,
    pub killmail: KillmailFull,
}
