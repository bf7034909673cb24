//! Input validation for entity names and IDs.
//!
//! Invalid tokens are filtered out before they reach ESI endpoints; a
//! malformed name or a non-positive ID inside a batch request fails the
//! entire request upstream, so both are rejected at the boundary.

/// Minimum length CCP accepts for a character, corporation, or alliance name.
pub const MIN_NAME_LENGTH: usize = 3;

/// Maximum length of an EVE entity name (alliance names cap at 50).
pub const MAX_NAME_LENGTH: usize = 50;

/// Validates an entity name query before resolution.
///
/// Accepts printable ASCII names of 3-50 characters. EVE names may contain
/// letters, digits, spaces, and a small punctuation set (`'`, `-`, `.`).
pub fn is_valid_entity_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.len() < MIN_NAME_LENGTH || trimmed.len() > MAX_NAME_LENGTH {
        return false;
    }

    trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '\'' | '-' | '.' | '_'))
}

/// Filters a list of IDs down to positive values.
///
/// Non-integer and negative IDs observed in upstream payloads are treated
/// as corrupt and skipped rather than propagated into joins.
pub fn sanitize_entity_ids(ids: Vec<i64>) -> Vec<i64> {
    ids.into_iter().filter(|&id| id > 0).collect()
}
