//! # Module Manager
//!
//! Drives pluggable [`Module`]s through three phases around the content
//! stage:
//!
//! | Phase | Manager stage | Runs before |
//! |-------|---------------|-------------|
//! | `Early` | 1 | module `run` |
//! | `Run`   | 2 | content `run` |
//! | `Late`  | 3 | content `output` |
//!
//! Modules see the page and may register Systems with the content manager
//! during `Early` and `Run`. Registration after the content stage ran is a
//! stage violation.

use super::content::ContentManager;
use crate::entity::Entity;
use crate::lifecycle::{Capability, Managed, RunStage, Staged};
use crate::system::System;
use crate::types::FolioResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Phases a module takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModulePhase {
    /// Before anything else touches the page.
    Early,
    /// Main module work; last chance to register systems.
    Run,
    /// After systems rendered the page, before output.
    Late,
}

impl ModulePhase {
    /// Run-stage ordinal of this phase on the module manager.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        match self {
            ModulePhase::Early => 1,
            ModulePhase::Run => 2,
            ModulePhase::Late => 3,
        }
    }

    /// Phase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ModulePhase::Early => "early",
            ModulePhase::Run => "run",
            ModulePhase::Late => "late",
        }
    }
}

impl fmt::Display for ModulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a module can reach during a phase.
pub struct ModuleContext<'a> {
    page: &'a mut Entity,
    content: &'a mut ContentManager,
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(page: &'a mut Entity, content: &'a mut ContentManager) -> Self {
        Self { page, content }
    }

    /// The page being built.
    pub fn page(&mut self) -> &mut Entity {
        &mut *self.page
    }

    /// Register a system with the content manager.
    pub fn register_system<S: System>(&mut self, system: S) -> FolioResult<()> {
        self.content.register_system(system)
    }

    /// Remove a system from the content manager.
    pub fn unregister_system<S: System>(&mut self) -> FolioResult<bool> {
        self.content.unregister_system::<S>()
    }
}

/// A pluggable unit of request work. Every phase defaults to doing nothing.
pub trait Module {
    /// Name used for `modules.disabled` and in logs.
    fn name(&self) -> &str;

    /// Phase 1.
    fn run_early(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        let _ = cx;
        Ok(())
    }

    /// Phase 2.
    fn run(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        let _ = cx;
        Ok(())
    }

    /// Phase 3.
    fn run_late(&mut self, cx: &mut ModuleContext<'_>) -> FolioResult<()> {
        let _ = cx;
        Ok(())
    }
}

/// Singleton manager owning the request's modules.
pub struct ModuleManager {
    capability: Capability,
    stage: RunStage,
    modules: Managed<Vec<Box<dyn Module>>>,
    disabled: BTreeSet<String>,
}

impl ModuleManager {
    pub(crate) fn new(
        capability: Capability,
        modules: Vec<Box<dyn Module>>,
        disabled: &[String],
    ) -> Self {
        let modules = Managed::new(modules, &capability);
        Self {
            capability,
            stage: RunStage::for_type::<Self>(),
            modules,
            disabled: disabled.iter().cloned().collect(),
        }
    }

    /// Names of all modules, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    /// Whether the named module is skipped.
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }

    /// Phase 1 (stage 1).
    pub fn run_early(&mut self, page: &mut Entity, content: &mut ContentManager) -> FolioResult<()> {
        self.drive(ModulePhase::Early, page, content)
    }

    /// Phase 2 (stage 2).
    pub fn run(&mut self, page: &mut Entity, content: &mut ContentManager) -> FolioResult<()> {
        self.drive(ModulePhase::Run, page, content)
    }

    /// Phase 3 (stage 3).
    pub fn run_late(&mut self, page: &mut Entity, content: &mut ContentManager) -> FolioResult<()> {
        self.drive(ModulePhase::Late, page, content)
    }

    fn drive(
        &mut self,
        phase: ModulePhase,
        page: &mut Entity,
        content: &mut ContentManager,
    ) -> FolioResult<()> {
        self.stage.assert_stage(phase.ordinal())?;

        let modules = self.modules.get_mut(&self.capability)?;
        for module in modules.iter_mut() {
            if self.disabled.contains(module.name()) {
                debug!(module = module.name(), %phase, "module disabled; skipped");
                continue;
            }
            debug!(module = module.name(), %phase, "run module");
            let mut cx = ModuleContext::new(page, content);
            match phase {
                ModulePhase::Early => module.run_early(&mut cx)?,
                ModulePhase::Run => module.run(&mut cx)?,
                ModulePhase::Late => module.run_late(&mut cx)?,
            }
        }
        Ok(())
    }
}

impl Staged for ModuleManager {
    fn run_stage(&self) -> &RunStage {
        &self.stage
    }
}

impl fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManager")
            .field("modules", &self.names())
            .field("disabled", &self.disabled)
            .field("stage", &self.stage)
            .finish()
    }
}
