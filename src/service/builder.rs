//! Unified record construction.
//!
//! Joins resolved entities with affiliations and org info into one record
//! per input name. A character whose affiliation or corporation info is
//! missing still yields a record, flagged by `org: None`; the join never
//! drops a resolved entity.

use std::collections::HashMap;

use crate::model::entity::{
    Affiliation, AllianceInfo, CorpInfo, OrgContext, ResolvedEntity, ResolvedNames, UnifiedRecord,
};
use crate::progress::ProgressReporter;

/// Joins resolution output with enrichment maps into unified records.
///
/// Record order follows the resolution output: characters, then
/// corporations, then alliances.
pub fn build_unified_records(
    resolved: &ResolvedNames,
    affiliations: &HashMap<i64, Affiliation>,
    corporations: &HashMap<i64, CorpInfo>,
    alliances: &HashMap<i64, AllianceInfo>,
    reporter: &ProgressReporter,
) -> Vec<UnifiedRecord> {
    let mut records = Vec::new();

    for character in &resolved.characters {
        records.push(build_character_record(
            character,
            affiliations,
            corporations,
            alliances,
            reporter,
        ));
    }

    for corporation in &resolved.corporations {
        if !valid_id(corporation, reporter) {
            continue;
        }
        let info = corporations.get(&corporation.id);
        records.push(UnifiedRecord::Corporation {
            corporation_id: corporation.id,
            corporation_name: corporation.name.clone(),
            war_eligible: info.map(|i| i.war_eligible).unwrap_or(false),
        });
    }

    for alliance in &resolved.alliances {
        if !valid_id(alliance, reporter) {
            continue;
        }
        records.push(UnifiedRecord::Alliance {
            alliance_id: alliance.id,
            alliance_name: alliance.name.clone(),
            // Alliances can always be declared war on.
            war_eligible: true,
        });
    }

    records
}

fn build_character_record(
    character: &ResolvedEntity,
    affiliations: &HashMap<i64, Affiliation>,
    corporations: &HashMap<i64, CorpInfo>,
    alliances: &HashMap<i64, AllianceInfo>,
    reporter: &ProgressReporter,
) -> UnifiedRecord {
    let org = affiliations.get(&character.id).and_then(|affiliation| {
        if affiliation.corporation_id <= 0 {
            reporter.warn(&format!(
                "rejecting non-positive corporation id {} for character {}",
                affiliation.corporation_id, character.id
            ));
            return None;
        }

        let corp = corporations
            .get(&affiliation.corporation_id)
            .cloned()
            .unwrap_or_else(|| CorpInfo::unknown(affiliation.corporation_id));

        let alliance_id = affiliation.alliance_id.filter(|id| *id > 0);
        let alliance_name = alliance_id
            .and_then(|id| alliances.get(&id))
            .map(|info| info.name.clone());

        Some(OrgContext {
            corporation_id: affiliation.corporation_id,
            corporation_name: corp.name,
            alliance_id,
            alliance_name,
            war_eligible: corp.war_eligible,
        })
    });

    if org.is_none() {
        reporter.warn(&format!(
            "no affiliation loaded for character {} ({})",
            character.name, character.id
        ));
    }

    UnifiedRecord::Character {
        character_id: character.id,
        character_name: character.name.clone(),
        org,
    }
}

fn valid_id(entity: &ResolvedEntity, reporter: &ProgressReporter) -> bool {
    if entity.id <= 0 {
        reporter.warn(&format!(
            "rejecting non-positive id {} for {:?}",
            entity.id, entity.name
        ));
        return false;
    }
    true
}
