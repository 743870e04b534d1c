//! Error types for the effects core.

use thiserror::Error;

use crate::stage::EffectId;

/// Result type for effects-core operations
pub type FxResult<T> = Result<T, FxError>;

/// Errors raised inside the effects core.
///
/// None of these reach the page as a user-visible state: capability failures
/// degrade to the static fallback and per-frame failures are absorbed by the
/// [`Stage`](crate::stage::Stage).
#[derive(Error, Debug)]
pub enum FxError {
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("invalid content: {0}")]
    Content(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("non-finite state in {0}")]
    NonFinite(&'static str),

    #[error("no effect mounted with id {0}")]
    UnknownEffect(EffectId),
}
