use thiserror::Error;

/// Validation failures for user-adjustable settings.
///
/// Both variants carry enough detail to explain the rejection precisely;
/// a failed write never mutates stored state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown setting key: {0:?}")]
    UnknownKey(String),
    #[error("Value {value} for {key} is outside the allowed range {min}..={max}")]
    OutOfBounds {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
