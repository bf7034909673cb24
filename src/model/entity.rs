//! Resolved entities, affiliations, and the unified enrichment record.

use serde::{Deserialize, Serialize};

/// The three entity kinds the pipeline resolves and analyzes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Corporation,
    Alliance,
}

impl EntityKind {
    /// Wire name used in zKill queries and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Corporation => "corporation",
            Self::Alliance => "alliance",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name resolved to its server-side identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub id: i64,
    /// Server-authoritative casing, which may differ from the query.
    pub name: String,
    pub kind: EntityKind,
}

/// Output of a batch name resolution, split by kind.
///
/// `missing` preserves the queries that resolved to nothing; they are
/// reported but never abort the batch.
#[derive(Clone, Debug, Default)]
pub struct ResolvedNames {
    pub characters: Vec<ResolvedEntity>,
    pub corporations: Vec<ResolvedEntity>,
    pub alliances: Vec<ResolvedEntity>,
    pub missing: Vec<String>,
}

impl ResolvedNames {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.corporations.is_empty() && self.alliances.is_empty()
    }
}

/// A character's current corporation and optional alliance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub character_id: i64,
    pub corporation_id: i64,
    pub alliance_id: Option<i64>,
}

/// Corporation metadata relevant to enrichment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpInfo {
    pub corporation_id: i64,
    pub name: String,
    pub war_eligible: bool,
}

impl CorpInfo {
    /// Sentinel used when corporation info could not be fetched, so
    /// downstream joins never fail.
    pub fn unknown(corporation_id: i64) -> Self {
        Self {
            corporation_id,
            name: "Unknown Corporation".to_string(),
            war_eligible: false,
        }
    }
}

/// Alliance metadata relevant to enrichment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceInfo {
    pub alliance_id: i64,
    pub name: String,
}

/// Organization context attached to a character record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    pub corporation_id: i64,
    pub corporation_name: String,
    pub alliance_id: Option<i64>,
    pub alliance_name: Option<String>,
    pub war_eligible: bool,
}

/// One enriched result per input name, tagged by its primary kind.
///
/// A character whose affiliation or corporation info could not be loaded
/// carries `org: None`; consumers render that as an error placeholder
/// rather than the pipeline aborting the whole batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnifiedRecord {
    Character {
        character_id: i64,
        character_name: String,
        org: Option<OrgContext>,
    },
    Corporation {
        corporation_id: i64,
        corporation_name: String,
        war_eligible: bool,
    },
    Alliance {
        alliance_id: i64,
        alliance_name: String,
        /// Alliances are war-eligible by convention.
        war_eligible: bool,
    },
}

impl UnifiedRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Character { .. } => EntityKind::Character,
            Self::Corporation { .. } => EntityKind::Corporation,
            Self::Alliance { .. } => EntityKind::Alliance,
        }
    }

    /// Name of the primary entity this record describes.
    pub fn primary_name(&self) -> &str {
        match self {
            Self::Character { character_name, .. } => character_name,
            Self::Corporation {
                corporation_name, ..
            } => corporation_name,
            Self::Alliance { alliance_name, .. } => alliance_name,
        }
    }

    pub fn primary_id(&self) -> i64 {
        match self {
            Self::Character { character_id, .. } => *character_id,
            Self::Corporation { corporation_id, .. } => *corporation_id,
            Self::Alliance { alliance_id, .. } => *alliance_id,
        }
    }
}
