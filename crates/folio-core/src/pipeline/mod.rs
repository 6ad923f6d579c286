//! # Pipeline Module
//!
//! The orchestrator that drives the built-in managers through one request.
//!
//! ## Order
//!
//! ```text
//! Website.run        (Website stage 1)
//! Module.run_early   (ModuleManager stage 1)
//! Module.run         (ModuleManager stage 2)
//! Content.run        (ContentManager stage 1)
//! Module.run_late    (ModuleManager stage 3)
//! Content.output     (ContentManager stage 2)
//! ```
//!
//! The pipeline itself has a single stage. A second `run` is a no-op that
//! logs a warning and returns `Ok(None)`. Any error from a manager, module or
//! system aborts the request: it is logged at `error` and propagated.
//!
//! The pipeline owns the three singleton slots. They are filled by
//! [`PipelineBuilder::build`] and reset after the run, whether it succeeded
//! or not.

mod config;
mod content;
mod module;
mod website;

pub use config::{ContentConfig, ModulesConfig, PipelineConfig, SiteConfig};
pub use content::ContentManager;
pub use module::{Module, ModuleContext, ModuleManager, ModulePhase};
pub use website::{Request, Route, Website};

use crate::entity::Entity;
use crate::lifecycle::{RunStage, Singleton, Staged};
use crate::system::{Scheduler, System};
use crate::types::FolioResult;
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

type Registration = Box<dyn FnOnce(&mut Scheduler) -> FolioResult<()>>;

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    /// Request path joined under the site's base path.
    pub path: String,
    /// Concatenated layout buffers.
    pub body: String,
    /// Systems executed by the content stage, in order.
    pub systems: Vec<&'static str>,
}

/// Collects modules and systems for a [`Pipeline`].
pub struct PipelineBuilder {
    config: PipelineConfig,
    modules: Vec<Box<dyn Module>>,
    registrations: Vec<Registration>,
}

impl PipelineBuilder {
    /// Add a module. Modules run in the order they are added.
    #[must_use]
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Add an already boxed module.
    #[must_use]
    pub fn boxed_module(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// Register a system with the content manager's scheduler.
    ///
    /// A second system of the same type makes [`PipelineBuilder::build`]
    /// fail with `DuplicateSystem`.
    #[must_use]
    pub fn system<S: System>(mut self, system: S) -> Self {
        self.registrations
            .push(Box::new(move |scheduler| scheduler.register(system)));
        self
    }

    /// Validate the configuration and construct the managers.
    pub fn build(self) -> FolioResult<Pipeline> {
        self.assemble()
            .inspect_err(|err| error!(error = %err, "pipeline build failed"))
    }

    fn assemble(self) -> FolioResult<Pipeline> {
        self.config.validate()?;

        let mut scheduler = Scheduler::new();
        for register in self.registrations {
            register(&mut scheduler)?;
        }

        let mut pipeline = Pipeline {
            stage: RunStage::for_type::<Pipeline>(),
            website: Singleton::new(),
            modules: Singleton::new(),
            content: Singleton::new(),
            config: self.config,
        };

        let site = pipeline.config.site.clone();
        pipeline.website.init(Website::new(site))?;

        let modules = self.modules;
        let disabled = &pipeline.config.modules.disabled;
        pipeline
            .modules
            .init_with(|capability| Ok(ModuleManager::new(capability, modules, disabled)))?;

        let layout = &pipeline.config.content;
        pipeline
            .content
            .init_with(|capability| Ok(ContentManager::new(capability, scheduler, layout)))?;

        debug!(
            site = %pipeline.config.site.name,
            systems = pipeline.content.instance()?.scheduler().len(),
            "pipeline built"
        );
        Ok(pipeline)
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("modules", &self.modules.len())
            .field("systems", &self.registrations.len())
            .finish()
    }
}

/// Drives the managers through one request.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    stage: RunStage,
    website: Singleton<Website>,
    modules: Singleton<ModuleManager>,
    content: Singleton<ContentManager>,
}

impl Pipeline {
    /// Ordinal of [`Pipeline::run`].
    pub const RUN: u32 = 1;

    /// Start building a pipeline for `config`.
    #[must_use]
    pub fn builder(config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            modules: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// A pipeline with no modules and no systems.
    pub fn new(config: PipelineConfig) -> FolioResult<Self> {
        Self::builder(config).build()
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether the single run already happened.
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.stage.has_run(Self::RUN)
    }

    /// The website manager, until teardown.
    pub fn website(&self) -> FolioResult<&Website> {
        self.website.instance()
    }

    /// The module manager, until teardown.
    pub fn modules(&self) -> FolioResult<&ModuleManager> {
        self.modules.instance()
    }

    /// The content manager, until teardown.
    pub fn content(&self) -> FolioResult<&ContentManager> {
        self.content.instance()
    }

    /// Systems the content stage would run for `request`, in order.
    ///
    /// Evaluated against the page as the website stage leaves it. Systems
    /// that modules register during their phases, and components they attach,
    /// are not visible here.
    pub fn plan(&self, request: &Request) -> FolioResult<Vec<&'static str>> {
        let website = self.website.instance()?;
        let content = self.content.instance()?;

        let mut page = Entity::new(request.path());
        page.add(website.route_for(request));
        for component in request.components() {
            page.attach(component.clone());
        }
        Ok(content.scheduler().plan(&page))
    }

    /// Run the request through every manager stage.
    ///
    /// Returns `Ok(None)` without doing anything if the pipeline already ran.
    pub fn run(&mut self, request: &Request) -> FolioResult<Option<RenderedPage>> {
        if self.has_run() {
            warn!(
                path = request.path(),
                "pipeline already ran; ignoring repeated run"
            );
            return Ok(None);
        }
        self.stage.assert_stage(Self::RUN)?;

        let outcome = self.drive(request);
        self.teardown();

        match outcome {
            Ok(page) => {
                info!(
                    path = %page.path,
                    systems = page.systems.len(),
                    bytes = page.body.len(),
                    "page rendered"
                );
                Ok(Some(page))
            }
            Err(err) => {
                error!(path = request.path(), error = %err, "pipeline aborted");
                Err(err)
            }
        }
    }

    fn drive(&mut self, request: &Request) -> FolioResult<RenderedPage> {
        let mut page = Entity::new(request.path());

        let website = self.website.instance_mut()?;
        website.run(request, &mut page)?;
        let path = website.route_for(request).full_path;
        let website_stage = website.current_stage();

        let modules = self.modules.instance_mut()?;
        let content = self.content.instance_mut()?;
        modules.run_early(&mut page, content)?;
        modules.run(&mut page, content)?;
        let report = content.run(&mut page)?;
        modules.run_late(&mut page, content)?;
        let body = content.output(&page)?;

        debug!(
            website = website_stage,
            modules = modules.current_stage(),
            content = content.current_stage(),
            "manager stages complete"
        );
        Ok(RenderedPage {
            path,
            body,
            systems: report.executed,
        })
    }

    fn teardown(&mut self) {
        self.content.reset();
        self.modules.reset();
        self.website.reset();
        debug!("pipeline torn down");
    }
}

// =============================================================================
// TESTS
// =============================================================================
