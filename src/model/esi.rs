//! Wire DTOs for the ESI endpoints the pipeline consumes.

use serde::{Deserialize, Serialize};

/// One `{id, name}` pair from `POST /universe/ids/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdName {
    pub id: i64,
    pub name: String,
}

/// Response body of `POST /universe/ids/`. Absent categories are omitted
/// by the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UniverseIdsResponse {
    #[serde(default)]
    pub characters: Vec<IdName>,
    #[serde(default)]
    pub corporations: Vec<IdName>,
    #[serde(default)]
    pub alliances: Vec<IdName>,
}

/// One row of `POST /characters/affiliation/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterAffiliationDto {
    pub character_id: i64,
    pub corporation_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<i64>,
}

/// Response body of `GET /corporations/{id}/`, reduced to the fields the
/// pipeline consumes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorporationDto {
    pub name: String,
    #[serde(default)]
    pub war_eligible: Option<bool>,
}

/// Response body of `GET /alliances/{id}/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllianceDto {
    pub name: String,
}

/// Response body of `GET /universe/systems/{id}/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolarSystemDto {
    pub name: String,
    pub security_status: f64,
}
