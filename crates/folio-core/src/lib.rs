//! # folio-core
//!
//! Tag-based dispatch and staged-execution kernel for server-rendered pages.
//!
//! A request is rendered into an [`Entity`] that carries polymorphic
//! components. [`System`]s declare a [`Family`] over component classes; the
//! [`Scheduler`] runs the admitted ones in priority order. A fixed
//! [`Pipeline`] drives the built-in managers through their stages.
//!
//! ## Lifecycle Discipline
//!
//! - [`Singleton`]: at most one live instance per slot, explicit reset
//! - [`Managed`]: only the owning singleton instance may mutate
//! - [`RunStage`]: phases run once, in order, with no gaps
//!
//! ## Architectural Constraints
//!
//! The kernel:
//! - Has NO async, NO I/O, NO process boundary (pure Rust)
//! - Is single-threaded: components are shared through `Rc`
//! - Dispatches deterministically from registration order and priority
//! - Emits `tracing` events but never installs a subscriber

// =============================================================================
// MODULES
// =============================================================================

pub mod component;
pub mod entity;
pub mod family;
pub mod lifecycle;
pub mod pipeline;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{FolioError, FolioResult, Priority, short_type_name};

// =============================================================================
// RE-EXPORTS: Components and Dispatch
// =============================================================================

pub use component::{AsAny, Class, Component, ComponentClass, ComponentRef};
pub use entity::Entity;
pub use family::Family;
pub use system::{RunReport, Scheduler, System};

// =============================================================================
// RE-EXPORTS: Lifecycle
// =============================================================================

pub use lifecycle::{Capability, FIRST_STAGE, InstanceId, Managed, RunStage, Singleton, Staged};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use pipeline::{
    ContentConfig, ContentManager, Module, ModuleContext, ModuleManager, ModulePhase,
    ModulesConfig, Pipeline, PipelineBuilder, PipelineConfig, RenderedPage, Request, Route,
    SiteConfig, Website,
};
