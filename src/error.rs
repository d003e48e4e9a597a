use alloc::string::String;

use thiserror::Error;

use crate::store::StoreError;

/// Failure to load or save the persisted effect configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config store: {0}")]
    Store(#[from] StoreError),

    #[error("malformed record: {0}")]
    Parse(serde_json::Error),

    #[error("unknown effect name {0:?}")]
    UnknownEffect(String),

    #[error("{count} effects exceed the list capacity of {capacity}")]
    TooManyEffects { count: usize, capacity: usize },

    #[error("record describes {found:?}, expected {expected:?}")]
    EffectMismatch {
        expected: &'static str,
        found: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
