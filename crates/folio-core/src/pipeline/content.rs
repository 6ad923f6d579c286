//! # Content Manager
//!
//! Owns the request's [`Scheduler`] and turns the page into output.
//!
//! - Stage 1, `run`: dispatch every admitted system against the page.
//! - Stage 2, `output`: concatenate the layout's content buffers.
//!
//! The scheduler is a managed object: only this manager mutates it. Systems
//! are registered through [`ContentManager::register_system`], which refuses
//! once stage 1 has run.

use super::config::ContentConfig;
use crate::entity::Entity;
use crate::lifecycle::{Capability, Managed, RunStage, Staged};
use crate::system::{RunReport, Scheduler, System};
use crate::types::FolioResult;
use tracing::{debug, trace};

/// Singleton manager for systems and output assembly.
#[derive(Debug)]
pub struct ContentManager {
    capability: Capability,
    stage: RunStage,
    scheduler: Managed<Scheduler>,
    layout: Vec<String>,
    last_report: Option<RunReport>,
}

impl ContentManager {
    /// Ordinal of [`ContentManager::run`].
    pub const RUN: u32 = 1;
    /// Ordinal of [`ContentManager::output`].
    pub const OUTPUT: u32 = 2;

    pub(crate) fn new(capability: Capability, scheduler: Scheduler, config: &ContentConfig) -> Self {
        let scheduler = Managed::new(scheduler, &capability);
        Self {
            capability,
            stage: RunStage::for_type::<Self>(),
            scheduler,
            layout: config.layout.clone(),
            last_report: None,
        }
    }

    /// Read-only view of the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Report of the content stage, once it ran.
    #[must_use]
    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// Buffer names emitted by `output`, in order.
    #[must_use]
    pub fn layout(&self) -> &[String] {
        &self.layout
    }

    /// Register a system for the content stage.
    ///
    /// Fails with `StageAlreadyRun` once the content stage ran, and with
    /// `DuplicateSystem` if the type is already registered.
    pub fn register_system<S: System>(&mut self, system: S) -> FolioResult<()> {
        self.stage.ensure_pending(Self::RUN)?;
        self.scheduler.get_mut(&self.capability)?.register(system)
    }

    /// Remove a system before the content stage. `Ok(false)` if it was absent.
    pub fn unregister_system<S: System>(&mut self) -> FolioResult<bool> {
        self.stage.ensure_pending(Self::RUN)?;
        Ok(self.scheduler.get_mut(&self.capability)?.unregister::<S>())
    }

    /// Stage 1: run the admitted systems against `page`.
    pub fn run(&mut self, page: &mut Entity) -> FolioResult<RunReport> {
        self.stage.assert_stage(Self::RUN)?;

        let report = self.scheduler.get_mut(&self.capability)?.run_all(page)?;
        debug!(
            page = page.name(),
            systems = ?report.executed,
            "content stage"
        );
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Stage 2: concatenate the layout's buffers into the page body.
    ///
    /// Buffers that no system wrote contribute nothing; buffers outside the
    /// layout are not emitted.
    pub fn output(&mut self, page: &Entity) -> FolioResult<String> {
        self.stage.assert_stage(Self::OUTPUT)?;

        let mut body = String::new();
        for name in &self.layout {
            if let Some(text) = page.buffer(name) {
                trace!(buffer = %name, bytes = text.len(), "emit buffer");
                body.push_str(text);
            }
        }
        Ok(body)
    }
}

impl Staged for ContentManager {
    fn run_stage(&self) -> &RunStage {
        &self.stage
    }
}

// =============================================================================
// TESTS
// =============================================================================
