//! Error types for kforge
//!
//! Absence errors are sentinels: callers compare them with `==` against
//! [`ResourceKind::absent`] or [`Error::argument_absent`] rather than matching
//! on message text. The remaining variants carry context for conversion and
//! document loading failures.

use thiserror::Error;

use crate::kinds::ResourceKind;

/// Main error type for kforge operations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The resource a builder function was asked to mutate is absent
    #[error("{kind} is absent")]
    ResourceAbsent {
        /// Kind of the missing target record
        kind: ResourceKind,
    },

    /// A required reference-typed argument is absent
    #[error("required argument {argument} is absent")]
    ArgumentAbsent {
        /// Name of the missing argument (e.g., "container", "spec")
        argument: &'static str,
    },

    /// A duration string in a config could not be used
    #[error("invalid duration {value:?} for {field}: {message}")]
    InvalidDuration {
        /// Config field holding the duration (e.g., "interval")
        field: String,
        /// The raw value as written in the config
        value: String,
        /// Parser diagnostic
        message: String,
    },

    /// A config document could not be loaded
    #[error("config error: {message}")]
    Config {
        /// Description of what failed
        message: String,
        /// The config kind being loaded (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Sentinel for an absent target of the given kind
    pub const fn resource_absent(kind: ResourceKind) -> Self {
        Self::ResourceAbsent { kind }
    }

    /// Sentinel for an absent required argument
    pub const fn argument_absent(argument: &'static str) -> Self {
        Self::ArgumentAbsent { argument }
    }

    /// Create an invalid duration error
    pub fn invalid_duration(
        field: impl Into<String>,
        value: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::InvalidDuration {
            field: field.into(),
            value: value.into(),
            message: msg.into(),
        }
    }

    /// Create a config error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a config error with config kind context
    pub fn config_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Whether this error signals an absent target or argument
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Error::ResourceAbsent { .. } | Error::ArgumentAbsent { .. }
        )
    }

    /// The resource kind this error refers to, for target-absence sentinels
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Error::ResourceAbsent { kind } => Some(*kind),
            _ => None,
        }
    }
}
