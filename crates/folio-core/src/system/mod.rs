//! # System Module
//!
//! Systems and their scheduler.
//!
//! A System is a unit of processing: a [`Family`] deciding which entities it
//! applies to, an action run against the entity, and a [`Priority`]. Systems
//! are registered with a [`Scheduler`], at most one per concrete type.

mod scheduler;

pub use scheduler::*;

use crate::component::AsAny;
use crate::entity::Entity;
use crate::family::Family;
use crate::types::{FolioResult, Priority, short_type_name};

/// A registered unit of processing.
///
/// Returning an error from [`System::process`] aborts the remaining systems
/// of the pass and propagates out of the pipeline.
pub trait System: AsAny {
    /// Admission predicate.
    fn family(&self) -> &Family;

    /// Dispatch priority; lower runs earlier.
    fn priority(&self) -> Priority {
        Priority::DEFAULT
    }

    /// Process an admitted entity.
    fn process(&mut self, entity: &mut Entity) -> FolioResult<()>;

    /// Name used in logs and run reports.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}
