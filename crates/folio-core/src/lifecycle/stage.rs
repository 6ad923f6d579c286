//! # Run Stages
//!
//! Ordered, once-only phase execution for multi-phase objects.
//!
//! ## Protocol
//!
//! | Call | Current | Result |
//! |------|---------|--------|
//! | `assert_stage(n)` | `n` | ok, current becomes `n + 1` |
//! | `assert_stage(n)` | `> n` | `StageAlreadyRun` |
//! | `assert_stage(n)` | `< n` | `StageSkipped` |
//!
//! Each phase method calls `assert_stage` with its own fixed ordinal before
//! doing any work, so phases run exactly once, in order, with no gaps. The
//! counter is per object and never decreases.

use crate::types::{FolioError, FolioResult, short_type_name};
use tracing::trace;

/// Ordinal of the first stage of every object.
pub const FIRST_STAGE: u32 = 1;

/// Monotonic stage counter owned by one multi-phase object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStage {
    owner: &'static str,
    current: u32,
}

impl RunStage {
    /// Counter for an object named `owner`, starting at stage 1.
    #[must_use]
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            current: FIRST_STAGE,
        }
    }

    /// Counter named after the type `T`.
    #[must_use]
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(short_type_name::<T>())
    }

    /// Name of the owning object.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// The stage that may run next.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Whether `stage` has already run.
    #[must_use]
    pub fn has_run(&self, stage: u32) -> bool {
        stage < self.current
    }

    /// Check `stage` against the counter without advancing it.
    pub fn check(&self, stage: u32) -> FolioResult<()> {
        if stage < self.current {
            return Err(FolioError::StageAlreadyRun {
                owner: self.owner,
                stage,
                current: self.current,
            });
        }
        if stage > self.current {
            return Err(FolioError::StageSkipped {
                owner: self.owner,
                stage,
                current: self.current,
            });
        }
        Ok(())
    }

    /// Enter `stage`: it must be exactly the current stage.
    pub fn assert_stage(&mut self, stage: u32) -> FolioResult<()> {
        self.check(stage)?;
        self.current = self.current.saturating_add(1);
        trace!(owner = self.owner, stage, "enter stage");
        Ok(())
    }

    /// Fail with `StageAlreadyRun` if `stage` has already run.
    ///
    /// Used by operations that are only legal before a given phase.
    pub fn ensure_pending(&self, stage: u32) -> FolioResult<()> {
        if self.has_run(stage) {
            return Err(FolioError::StageAlreadyRun {
                owner: self.owner,
                stage,
                current: self.current,
            });
        }
        Ok(())
    }
}

/// Objects with ordered phases.
pub trait Staged {
    /// The object's stage counter.
    fn run_stage(&self) -> &RunStage;

    /// The stage that may run next.
    fn current_stage(&self) -> u32 {
        self.run_stage().current()
    }
}

// =============================================================================
// TESTS
// =============================================================================
