//! Error types for policyscope.
//!
//! All fatal errors are strongly typed using thiserror. Per-policy extraction
//! problems are not errors: they are collected as [`ExtractionWarning`] values
//! on the report and never abort a run.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PolicyId;

/// Configuration errors, rejected before any collaborator call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No setting context selected: at least one of machine or user must be included")]
    NoContextSelected,

    #[error("Invalid key filter '{pattern}': {reason}")]
    InvalidKeyFilter {
        pattern: String,
        reason: String,
    },

    #[error("Extraction worker count must be at least 1")]
    InvalidWorkerCount,
}

/// Failures reported by a [`PolicySource`](crate::source::PolicySource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Scope not found: {scope}")]
    ScopeNotFound {
        scope: String,
    },

    #[error("Directory unreachable: {message}")]
    Unreachable {
        message: String,
    },

    #[error("Policy object not found: {id}")]
    PolicyNotFound {
        id: PolicyId,
    },

    #[error("Malformed export for policy {id}: {reason}")]
    MalformedExport {
        id: PolicyId,
        reason: String,
    },

    #[error("Source backend error: {message}")]
    Backend {
        message: String,
    },
}

/// Top-level error type for a resolution run.
///
/// A run either produces a complete report or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Scope resolution failed for '{scope}': {source}")]
    ScopeResolution {
        scope: String,
        #[source]
        source: SourceError,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ResolveError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the scope's link list could not be obtained.
    #[must_use]
    pub const fn is_scope_resolution(&self) -> bool {
        matches!(self, Self::ScopeResolution { .. })
    }

    /// Returns true if the run configuration was rejected.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if running again could succeed without changing the input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ScopeResolution { source, .. } => {
                matches!(source, SourceError::Unreachable { .. } | SourceError::Backend { .. })
            }
            Self::Configuration(_) | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for resolution runs.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Why a policy object's contribution was dropped from a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// The collaborator failed to return the export.
    FetchFailed {
        /// Collaborator error message.
        message: String,
    },

    /// A required field was absent from one exported setting.
    MissingField {
        /// Index of the offending setting within the export.
        index: usize,
        /// Name of the missing field.
        field: String,
    },

    /// The setting's context was neither machine nor user.
    UnknownContext {
        /// Index of the offending setting within the export.
        index: usize,
        /// The context string as exported.
        context: String,
    },

    /// The same setting identity was asserted twice by one policy object.
    DuplicateSetting {
        /// Rendered identity.
        identity: String,
    },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed { message } => write!(f, "fetch failed: {message}"),
            Self::MissingField { index, field } => {
                write!(f, "setting #{index} is missing field '{field}'")
            }
            Self::UnknownContext { index, context } => {
                write!(f, "setting #{index} has unknown context '{context}'")
            }
            Self::DuplicateSetting { identity } => {
                write!(f, "setting {identity} asserted more than once")
            }
        }
    }
}

/// A recoverable per-policy extraction problem.
///
/// The named policy object is absent from every conflict group of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// The policy object whose contribution was skipped.
    pub policy_id: PolicyId,

    /// What went wrong.
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl ExtractionWarning {
    /// Creates a warning for a policy object.
    #[must_use]
    pub fn new(policy_id: PolicyId, kind: WarningKind) -> Self {
        Self { policy_id, kind }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "policy {}: {}", self.policy_id, self.kind)
    }
}
