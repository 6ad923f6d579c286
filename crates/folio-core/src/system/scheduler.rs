//! # Scheduler
//!
//! Registers Systems and runs the admitted ones against an entity.
//!
//! ## Dispatch
//!
//! `run_all` works in two steps:
//! 1. Snapshot: filter systems by `family().matches(entity)` and stable-sort
//!    the survivors by ascending priority. Equal priorities keep registration
//!    order.
//! 2. Run: invoke each system in the snapshot once, in order.
//!
//! Systems may change the entity's components while running. The snapshot is
//! not recomputed, so a system newly admitted by such a change waits for the
//! next pass.

use super::System;
use crate::entity::Entity;
use crate::types::{FolioError, FolioResult, Priority, short_type_name};
use serde::Serialize;
use std::any::TypeId;
use std::fmt;
use tracing::{debug, error, trace, warn};

struct SystemEntry {
    key: TypeId,
    name: &'static str,
    system: Box<dyn System>,
}

/// What a call to [`Scheduler::run_all`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Names of the systems that ran, in execution order.
    pub executed: Vec<&'static str>,
    /// Number of registered systems whose family did not admit the entity.
    pub filtered_out: usize,
}

/// Ordered collection of Systems, unique by concrete type.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<SystemEntry>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system.
    ///
    /// Fails with [`FolioError::DuplicateSystem`] if a system of the same
    /// concrete type is already registered.
    pub fn register<S: System>(&mut self, system: S) -> FolioResult<()> {
        let key = TypeId::of::<S>();
        if self.entries.iter().any(|entry| entry.key == key) {
            error!(system = short_type_name::<S>(), "system already registered");
            return Err(FolioError::DuplicateSystem {
                system: short_type_name::<S>(),
            });
        }

        let name = system.name();
        debug!(
            system = name,
            priority = system.priority().value(),
            family = %system.family(),
            "register system"
        );
        self.entries.push(SystemEntry {
            key,
            name,
            system: Box::new(system),
        });
        Ok(())
    }

    /// Remove the system of type `S`.
    ///
    /// Returns `false` (and logs a warning) if none was registered.
    pub fn unregister<S: System>(&mut self) -> bool {
        let key = TypeId::of::<S>();
        match self.entries.iter().position(|entry| entry.key == key) {
            Some(index) => {
                let entry = self.entries.remove(index);
                debug!(system = entry.name, "unregister system");
                true
            }
            None => {
                warn!(
                    system = short_type_name::<S>(),
                    "system not registered; nothing unregistered"
                );
                false
            }
        }
    }

    /// Whether a system of type `S` is registered.
    #[must_use]
    pub fn contains<S: System>(&self) -> bool {
        let key = TypeId::of::<S>();
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Borrow the registered system of type `S`.
    pub fn get<S: System>(&self) -> FolioResult<&S> {
        self.entries
            .iter()
            .find_map(|entry| (*entry.system).as_any().downcast_ref::<S>())
            .ok_or(FolioError::SystemNotFound {
                system: short_type_name::<S>(),
            })
    }

    /// Mutably borrow the registered system of type `S`.
    pub fn get_mut<S: System>(&mut self) -> FolioResult<&mut S> {
        self.entries
            .iter_mut()
            .find_map(|entry| (*entry.system).as_any_mut().downcast_mut::<S>())
            .ok_or(FolioError::SystemNotFound {
                system: short_type_name::<S>(),
            })
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of registered systems in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// Indices of admitted systems, in dispatch order.
    fn snapshot(&self, entity: &Entity) -> Vec<usize> {
        let mut admitted: Vec<(Priority, usize)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.system.family().matches(entity.components()))
            .map(|(index, entry)| (entry.system.priority(), index))
            .collect();

        // sort_by_key is stable: ties stay in registration order.
        admitted.sort_by_key(|(priority, _)| *priority);
        admitted.into_iter().map(|(_, index)| index).collect()
    }

    /// Names of the systems `run_all` would execute for `entity`, in order.
    #[must_use]
    pub fn plan(&self, entity: &Entity) -> Vec<&'static str> {
        self.snapshot(entity)
            .into_iter()
            .filter_map(|index| self.entries.get(index).map(|entry| entry.name))
            .collect()
    }

    /// Run every admitted system against `entity`, once, in dispatch order.
    ///
    /// The first system error stops the pass and is returned.
    pub fn run_all(&mut self, entity: &mut Entity) -> FolioResult<RunReport> {
        let order = self.snapshot(entity);
        let mut report = RunReport {
            executed: Vec::with_capacity(order.len()),
            filtered_out: self.entries.len().saturating_sub(order.len()),
        };

        for index in order {
            let Some(entry) = self.entries.get_mut(index) else {
                continue;
            };
            trace!(
                entity = entity.name(),
                system = entry.name,
                priority = entry.system.priority().value(),
                "dispatch system"
            );
            entry.system.process(entity)?;
            report.executed.push(entry.name);
        }

        debug!(
            entity = entity.name(),
            executed = report.executed.len(),
            filtered_out = report.filtered_out,
            "scheduler pass complete"
        );
        Ok(report)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("systems", &self.names())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_class;
    use crate::family::Family;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct DatabaseTag;
    struct ReadOnlyTag;
    struct FormTag;

    component_class!(DatabaseTag);
    component_class!(ReadOnlyTag);
    component_class!(FormTag);

    type Log = Rc<RefCell<Vec<&'static str>>>;

    struct Recorder {
        label: &'static str,
        family: Family,
        priority: i32,
        log: Log,
    }

    impl Recorder {
        fn process_into_log(&self) {
            self.log.borrow_mut().push(self.label);
        }
    }

    macro_rules! recorder_system {
        ($name:ident) => {
            struct $name(Recorder);

            impl System for $name {
                fn family(&self) -> &Family {
                    &self.0.family
                }

                fn priority(&self) -> Priority {
                    Priority::new(self.0.priority)
                }

                fn process(&mut self, _entity: &mut Entity) -> FolioResult<()> {
                    self.0.process_into_log();
                    Ok(())
                }
            }
        };
    }

    recorder_system!(S1);
    recorder_system!(S2);
    recorder_system!(S3);

    fn recorder(label: &'static str, priority: i32, family: Family, log: &Log) -> Recorder {
        Recorder {
            label,
            family,
            priority,
            log: Rc::clone(log),
        }
    }

    /// Attaches a FormTag when it runs.
    struct AddsForm;

    impl System for AddsForm {
        fn family(&self) -> &Family {
            static UNCONSTRAINED: std::sync::OnceLock<Family> = std::sync::OnceLock::new();
            UNCONSTRAINED.get_or_init(Family::new)
        }

        fn process(&mut self, entity: &mut Entity) -> FolioResult<()> {
            entity.add(FormTag);
            Ok(())
        }
    }

    struct Fails;

    impl System for Fails {
        fn family(&self) -> &Family {
            static UNCONSTRAINED: std::sync::OnceLock<Family> = std::sync::OnceLock::new();
            UNCONSTRAINED.get_or_init(Family::new)
        }

        fn priority(&self) -> Priority {
            Priority::new(1)
        }

        fn process(&mut self, _entity: &mut Entity) -> FolioResult<()> {
            Err(FolioError::aborted("Fails", "refusing"))
        }
    }

    #[test]
    fn equal_priorities_keep_registration_order() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(S1(recorder("S1", 10, Family::new(), &log)))
            .expect("S1");
        scheduler
            .register(S2(recorder("S2", 5, Family::new(), &log)))
            .expect("S2");
        scheduler
            .register(S3(recorder("S3", 10, Family::new(), &log)))
            .expect("S3");

        let mut page = Entity::new("/");
        let report = scheduler.run_all(&mut page).expect("run");

        assert_eq!(*log.borrow(), vec!["S2", "S1", "S3"]);
        assert_eq!(report.executed, vec!["S2", "S1", "S3"]);
        assert_eq!(report.filtered_out, 0);
    }

    #[test]
    fn duplicate_concrete_type_rejected() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(S1(recorder("a", 0, Family::new(), &log)))
            .expect("first");

        let second = scheduler.register(S1(recorder("b", 1, Family::new(), &log)));
        assert_eq!(second, Err(FolioError::DuplicateSystem { system: "S1" }));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn unregister_missing_is_nonfatal() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.unregister::<S1>());

        scheduler
            .register(S1(recorder("S1", 0, Family::new(), &log)))
            .expect("register");
        assert!(scheduler.contains::<S1>());
        assert!(scheduler.unregister::<S1>());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn filtered_systems_do_not_run() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        let writable = Family::new().all::<DatabaseTag>().none::<ReadOnlyTag>();
        scheduler
            .register(S1(recorder("writable", 0, writable, &log)))
            .expect("S1");
        scheduler
            .register(S2(recorder("forms", 0, Family::new().all::<FormTag>(), &log)))
            .expect("S2");

        let mut page = Entity::new("/");
        page.add(DatabaseTag);
        page.add(ReadOnlyTag);

        let report = scheduler.run_all(&mut page).expect("run");
        assert!(report.executed.is_empty());
        assert_eq!(report.filtered_out, 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn snapshot_ignores_components_added_mid_pass() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(AddsForm).expect("adds form");
        scheduler
            .register(S1(recorder("forms", 10, Family::new().all::<FormTag>(), &log)))
            .expect("S1");

        let mut page = Entity::new("/");
        let first = scheduler.run_all(&mut page).expect("first pass");
        assert_eq!(first.executed, vec!["AddsForm"]);
        assert!(page.has::<FormTag>());
        assert!(log.borrow().is_empty());

        let second = scheduler.run_all(&mut page).expect("second pass");
        assert_eq!(second.executed, vec!["AddsForm", "S1"]);
        assert_eq!(*log.borrow(), vec!["forms"]);
    }

    #[test]
    fn system_error_stops_the_pass() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(S1(recorder("before", 0, Family::new(), &log)))
            .expect("S1");
        scheduler.register(Fails).expect("fails");
        scheduler
            .register(S2(recorder("after", 2, Family::new(), &log)))
            .expect("S2");

        let mut page = Entity::new("/");
        let result = scheduler.run_all(&mut page);

        assert!(matches!(result, Err(FolioError::Aborted { .. })));
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[test]
    fn typed_access_and_plan() {
        let log = Log::default();
        let mut scheduler = Scheduler::new();
        scheduler
            .register(S1(recorder("db", 3, Family::new().all::<DatabaseTag>(), &log)))
            .expect("S1");
        scheduler
            .register(S2(recorder("any", 7, Family::new(), &log)))
            .expect("S2");

        assert_eq!(scheduler.get::<S1>().expect("S1").0.label, "db");
        scheduler.get_mut::<S2>().expect("S2").0.priority = 1;
        assert!(matches!(
            scheduler.get::<S3>(),
            Err(FolioError::SystemNotFound { system: "S3" })
        ));

        let mut page = Entity::new("/");
        page.add(DatabaseTag);
        assert_eq!(scheduler.plan(&page), vec!["S2", "S1"]);
        assert_eq!(scheduler.names(), vec!["S1", "S2"]);
        assert!(log.borrow().is_empty());
    }
}
