//! Error types for pool operations.
//!
//! One enum per failing subsystem. All public operations report failure
//! through these types; nothing in the workspace panics across the
//! public boundary.

use std::error::Error;
use std::fmt;

use crate::id::TemplateId;

/// Errors from spawning or preallocating instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnError {
    /// The host could not instantiate the template (unknown, null, or
    /// otherwise uninstantiable blueprint).
    InvalidTemplate {
        /// The template that failed to instantiate.
        template: TemplateId,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTemplate { template } => {
                write!(f, "host failed to instantiate template {template}")
            }
        }
    }
}

impl Error for SpawnError {}

/// Errors from replacing or reverting a template's allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplaceError {
    /// The template to replace has no allocator in this registry.
    ///
    /// Replace only reroutes existing allocators; it never creates one
    /// for the old key. The operation aborts with no state changed.
    UnknownTemplate {
        /// The template with no allocator.
        template: TemplateId,
    },
    /// The replacement failed to preallocate its new allocator.
    Preallocate {
        /// The underlying spawn failure.
        source: SpawnError,
    },
}

impl fmt::Display for ReplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTemplate { template } => {
                write!(f, "no allocator exists for template {template}")
            }
            Self::Preallocate { source } => {
                write!(f, "replacement preallocation failed: {source}")
            }
        }
    }
}

impl Error for ReplaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Preallocate { source } => Some(source),
            Self::UnknownTemplate { .. } => None,
        }
    }
}
