//! Errors for graph construction, actions and navigation.

use thiserror::Error;

use crate::perception::PerceptionError;

/// Invalid screen catalog or navigator settings. Fatal at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("screen '{0}' is defined more than once")]
    DuplicateScreen(String),

    #[error("{referenced_by} references undefined screen '{name}'")]
    UnknownScreen { referenced_by: String, name: String },

    #[error("invalid region for {owner}: {reason}")]
    InvalidRegion { owner: String, reason: String },

    #[error("max_retries must be at least 1")]
    InvalidRetries,

    #[error("catalog defines no screens")]
    EmptyCatalog,

    #[error("failed to read catalog {path}: {reason}")]
    CatalogLoad { path: String, reason: String },
}

/// A transition action could not be carried out.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("input failed: {0}")]
    Input(String),

    #[error("'{text}' not found on screen")]
    TextNotFound { text: String },

    #[error(transparent)]
    Perception(#[from] PerceptionError),
}

/// Why `detect_and_transition` did not reach its target.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown screen '{0}'")]
    UnknownScreen(String),

    #[error("perception unavailable: {0}")]
    PerceptionUnavailable(#[from] PerceptionError),

    #[error("no path from {from} to {to}")]
    NoPath { from: String, to: String },

    #[error("path step {from} -> {to} has no transition")]
    BrokenPathStep { from: String, to: String },

    #[error("action for {from} -> {to} failed: {source}")]
    ActionFailed {
        from: String,
        to: String,
        #[source]
        source: ActionError,
    },

    #[error("expected {expected} after hop, detected {detected}")]
    VerificationFailed { expected: String, detected: String },

    #[error("path to {target} exhausted; believed to be at {belief}")]
    NotReached { target: String, belief: String },

    #[error("failed to detect the initial screen after {attempts} attempts")]
    InitialDetectionFailed { attempts: u32 },

    #[error("window focus failed: {0}")]
    Focus(String),
}
