//! # Core Type Definitions
//!
//! This module contains the small shared types of the folio kernel:
//! - Dispatch ordering (`Priority`)
//! - Error types (`FolioError`, `FolioResult`)
//! - Type naming helpers used in diagnostics
//!
//! ## Error Discipline
//!
//! Errors fall into two groups:
//! - Discipline violations (singleton, managed-object, run-stage, duplicate
//!   system, aborted pipeline, configuration). These are wiring bugs and abort
//!   the current request.
//! - Lookups that found nothing (`ComponentNotFound`, `SystemNotFound`). These
//!   are ordinary control flow; probe with `has`/`contains` first or default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PRIORITY
// =============================================================================

/// Execution priority of a System.
///
/// Lower values run earlier. Systems with equal priority keep their
/// registration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Priority(pub i32);

impl Priority {
    /// Priority used by systems that do not declare one.
    pub const DEFAULT: Self = Self(0);

    /// Create a new priority with the given value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the raw priority value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TYPE NAMES
// =============================================================================

/// Short, path-free name of a type, used in logs and error messages.
///
/// `folio_core::pipeline::content::ContentManager` becomes `ContentManager`.
/// Generic arguments are dropped along with the path.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Result alias used by every fallible kernel operation.
pub type FolioResult<T> = Result<T, FolioError>;

/// Errors that can occur in the folio kernel.
///
/// - No silent failures: non-fatal conditions are logged, fatal ones returned
/// - Use `Result<T, FolioError>` for fallible operations
/// - The kernel never panics on wiring mistakes; it reports them here
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolioError {
    /// A second live instance of a singleton was constructed before `reset()`.
    #[error("Singleton {singleton} is already initialized")]
    AlreadyInitialized { singleton: &'static str },

    /// A singleton instance was requested before it was constructed.
    #[error("Singleton {singleton} is not initialized")]
    Uninitialized { singleton: &'static str },

    /// A manager-only operation was invoked by something other than the owner.
    #[error("{object} is managed by {manager}; call from {caller} rejected")]
    NotManagedByOwner {
        object: &'static str,
        caller: &'static str,
        manager: &'static str,
    },

    /// The requested manager class has no live singleton instance.
    #[error("Manager {manager} has no live singleton instance")]
    ManagerNotASingleton { manager: &'static str },

    /// A stage was asserted after it had already run.
    #[error("Stage {stage} of {owner} already ran (current stage is {current})")]
    StageAlreadyRun {
        owner: &'static str,
        stage: u32,
        current: u32,
    },

    /// A stage was asserted before the stages preceding it ran.
    #[error("Stage {stage} of {owner} skips ahead (current stage is {current})")]
    StageSkipped {
        owner: &'static str,
        stage: u32,
        current: u32,
    },

    /// A System of the same concrete type is already registered.
    #[error("System {system} is already registered")]
    DuplicateSystem { system: &'static str },

    /// No attached component matches the requested class.
    #[error("No component of class {class} is attached")]
    ComponentNotFound { class: &'static str },

    /// No System of the requested type is registered.
    #[error("System {system} is not registered")]
    SystemNotFound { system: &'static str },

    /// A System, Module or manager phase stopped the pipeline.
    #[error("Aborted by {origin}: {reason}")]
    Aborted { origin: String, reason: String },

    /// The pipeline configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FolioError {
    /// Build an `Aborted` error raised by `origin`.
    #[must_use]
    pub fn aborted(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Aborted {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the current request.
    ///
    /// Only lookups that found nothing are recoverable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ComponentNotFound { .. } | Self::SystemNotFound { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
