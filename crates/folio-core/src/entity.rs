//! # Entity
//!
//! The request-scoped render target (the "page").
//!
//! An entity owns:
//! - an attachment-ordered collection of components, keyed by identity
//! - named content buffers that systems render into
//!
//! ## Lookup Discipline
//!
//! Every class query reports "nothing matched" as
//! [`FolioError::ComponentNotFound`]; an `Ok` result is never empty.
//! Use [`Entity::has_class`] / [`Entity::has`] to probe first.
//!
//! Removing a component that is not attached, or attaching one that already
//! is, is a logged no-op.

use crate::component::{Class, ComponentClass, ComponentRef};
use crate::types::{FolioError, FolioResult};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// The render target for one request.
#[derive(Debug, Default)]
pub struct Entity {
    /// Request path or other label, used in logs.
    name: String,
    /// Attached components in attachment order.
    components: Vec<ComponentRef>,
    /// Named content buffers. BTreeMap for deterministic iteration.
    buffers: BTreeMap<String, String>,
}

impl Entity {
    /// Create an empty entity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Label of this entity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Attach a new component instance and return its handle.
    pub fn add<C: Class>(&mut self, component: C) -> ComponentRef {
        let handle = ComponentRef::new(component);
        trace!(entity = %self.name, class = C::NAME, "attach component");
        self.components.push(handle.clone());
        handle
    }

    /// Attach an existing component instance.
    ///
    /// Returns `false` (and logs a warning) if this exact instance is already
    /// attached. A different instance of the same class is always accepted.
    pub fn attach(&mut self, component: ComponentRef) -> bool {
        if self.components.contains(&component) {
            warn!(
                entity = %self.name,
                class = component.class().name(),
                "component already attached; ignoring"
            );
            return false;
        }
        trace!(entity = %self.name, class = component.class().name(), "attach component");
        self.components.push(component);
        true
    }

    /// Detach a component instance.
    ///
    /// Returns `false` (and logs a warning) if it was not attached.
    pub fn remove(&mut self, component: &ComponentRef) -> bool {
        match self.components.iter().position(|c| c == component) {
            Some(index) => {
                self.components.remove(index);
                true
            }
            None => {
                warn!(
                    entity = %self.name,
                    class = component.class().name(),
                    "component not attached; nothing removed"
                );
                false
            }
        }
    }

    /// Detach every component of `class` or a subtype. Returns how many went.
    pub fn remove_all_of_class(&mut self, class: &ComponentClass) -> usize {
        let before = self.components.len();
        self.components.retain(|c| !c.is_a(class));
        let removed = before - self.components.len();
        if removed == 0 {
            warn!(entity = %self.name, class = class.name(), "no components of class to remove");
        }
        removed
    }

    /// Detach every component of class `C` or a subtype.
    pub fn remove_all<C: Class>(&mut self) -> usize {
        self.remove_all_of_class(&ComponentClass::of::<C>())
    }

    /// First attached component of `class` or a subtype.
    pub fn first_of_class(&self, class: &ComponentClass) -> FolioResult<&ComponentRef> {
        self.components
            .iter()
            .find(|c| c.is_a(class))
            .ok_or(FolioError::ComponentNotFound {
                class: class.name(),
            })
    }

    /// All attached components of `class` or a subtype, in attachment order.
    pub fn all_of_class(&self, class: &ComponentClass) -> FolioResult<Vec<&ComponentRef>> {
        let found: Vec<_> = self.components.iter().filter(|c| c.is_a(class)).collect();
        if found.is_empty() {
            return Err(FolioError::ComponentNotFound {
                class: class.name(),
            });
        }
        Ok(found)
    }

    /// Whether any attached component is of `class` or a subtype.
    #[must_use]
    pub fn has_class(&self, class: &ComponentClass) -> bool {
        self.components.iter().any(|c| c.is_a(class))
    }

    /// Whether any attached component is of class `C` or a subtype.
    #[must_use]
    pub fn has<C: Class>(&self) -> bool {
        self.has_class(&ComponentClass::of::<C>())
    }

    /// First attached component whose concrete type is exactly `C`.
    ///
    /// Subtypes of `C` are not returned here since they cannot be viewed as a
    /// `C`; use [`Entity::first_of_class`] for subtype-aware lookup.
    pub fn get<C: Class>(&self) -> FolioResult<&C> {
        self.components
            .iter()
            .find_map(|c| c.downcast_ref::<C>())
            .ok_or(FolioError::ComponentNotFound { class: C::NAME })
    }

    /// All attached components whose concrete type is exactly `C`.
    pub fn get_all<C: Class>(&self) -> FolioResult<Vec<&C>> {
        let found: Vec<_> = self
            .components
            .iter()
            .filter_map(|c| c.downcast_ref::<C>())
            .collect();
        if found.is_empty() {
            return Err(FolioError::ComponentNotFound { class: C::NAME });
        }
        Ok(found)
    }

    /// Attached components in attachment order.
    #[must_use]
    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no components are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Detach all components. Content buffers are kept.
    pub fn clear(&mut self) {
        self.components.clear();
    }

    // =========================================================================
    // CONTENT BUFFERS
    // =========================================================================

    /// Contents of the named buffer, if it was ever written.
    #[must_use]
    pub fn buffer(&self, name: &str) -> Option<&str> {
        self.buffers.get(name).map(String::as_str)
    }

    /// Mutable access to the named buffer, creating it empty if needed.
    pub fn buffer_mut(&mut self, name: &str) -> &mut String {
        self.buffers.entry(name.to_string()).or_default()
    }

    /// Append `text` to the named buffer.
    pub fn append(&mut self, name: &str, text: &str) {
        self.buffer_mut(name).push_str(text);
    }

    /// Names of all buffers written so far, in sorted order.
    pub fn buffer_names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }
}

// =============================================================================
// TESTS
// =============================================================================
