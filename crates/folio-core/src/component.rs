//! # Components
//!
//! Components are opaque tag/payload objects attached to an [`Entity`].
//! The kernel never looks inside a component; matching only inspects its
//! class and that class's ancestry.
//!
//! ## Class Model
//!
//! Component kinds are open: any `'static` type becomes a component kind by
//! implementing [`Class`], usually through [`component_class!`]. A class may
//! declare a single parent class, which gives the "self or subtype" matching
//! used by [`Family`](crate::Family):
//!
//! ```
//! use folio_core::{component_class, ComponentClass};
//!
//! struct FormTag;
//! struct LoginForm;
//!
//! component_class!(FormTag);
//! component_class!(LoginForm: FormTag);
//!
//! let login = ComponentClass::of::<LoginForm>();
//! let form = ComponentClass::of::<FormTag>();
//! assert!(login.is_a(&form));
//! assert!(!form.is_a(&login));
//! ```
//!
//! Parent classes need not ever be instantiated; an empty enum used only as a
//! parent acts as an interface.
//!
//! [`Entity`]: crate::Entity

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Upper bound on ancestry walks. Deeper chains are treated as cyclic.
pub const MAX_ANCESTRY_DEPTH: usize = 64;

// =============================================================================
// CLASS
// =============================================================================

/// Object-safe access to `Any` for kernel trait objects.
pub trait AsAny: Any {
    /// View this value as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// View this value as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A component kind.
///
/// Implement with [`component_class!`] rather than by hand.
pub trait Class: Any {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// The parent class, if this class is a subtype of another.
    fn parent() -> Option<ComponentClass> {
        None
    }
}

/// Declare one or more types as component classes.
///
/// `component_class!(Tag)` declares a root class; `component_class!(Child: Parent)`
/// declares `Child` as a subtype of `Parent`.
#[macro_export]
macro_rules! component_class {
    ($ty:ty : $parent:ty) => {
        impl $crate::Class for $ty {
            const NAME: &'static str = stringify!($ty);

            fn parent() -> ::core::option::Option<$crate::ComponentClass> {
                ::core::option::Option::Some($crate::ComponentClass::of::<$parent>())
            }
        }
    };
    ($ty:ty) => {
        impl $crate::Class for $ty {
            const NAME: &'static str = stringify!($ty);
        }
    };
}

/// Runtime descriptor of a component class.
///
/// Two descriptors are equal when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct ComponentClass {
    id: TypeId,
    name: &'static str,
    parent: fn() -> Option<ComponentClass>,
}

impl ComponentClass {
    /// Descriptor for the class `C`.
    #[must_use]
    pub fn of<C: Class>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: C::NAME,
            parent: C::parent,
        }
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct parent class, if any.
    #[must_use]
    pub fn parent(&self) -> Option<ComponentClass> {
        (self.parent)()
    }

    /// This class followed by each ancestor, nearest first.
    pub fn ancestry(&self) -> impl Iterator<Item = ComponentClass> {
        std::iter::successors(Some(*self), ComponentClass::parent).take(MAX_ANCESTRY_DEPTH)
    }

    /// Whether this class equals `other` or is a subtype of it.
    #[must_use]
    pub fn is_a(&self, other: &ComponentClass) -> bool {
        self.ancestry().any(|class| class.id == other.id)
    }
}

impl PartialEq for ComponentClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentClass {}

impl Hash for ComponentClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Object-safe view of a component instance.
///
/// Implemented for every [`Class`]; there is nothing to implement by hand.
pub trait Component: AsAny {
    /// Runtime class of this instance.
    fn class(&self) -> ComponentClass;
}

impl<C: Class> Component for C {
    fn class(&self) -> ComponentClass {
        ComponentClass::of::<C>()
    }
}

/// Shared handle to an attached component.
///
/// Equality is identity: two handles are equal only when they point at the
/// same instance, never because their payloads compare equal. Detaching a
/// component from an entity drops the entity's handle; the instance lives on
/// while other handles exist.
#[derive(Clone)]
pub struct ComponentRef(Rc<dyn Component>);

impl ComponentRef {
    /// Wrap a component instance in a new handle.
    #[must_use]
    pub fn new<C: Class>(component: C) -> Self {
        Self(Rc::new(component))
    }

    /// Runtime class of the referenced instance.
    #[must_use]
    pub fn class(&self) -> ComponentClass {
        (*self.0).class()
    }

    /// Whether the referenced instance is of class `class` or a subtype.
    #[must_use]
    pub fn is_a(&self, class: &ComponentClass) -> bool {
        self.class().is_a(class)
    }

    /// Borrow the instance as its concrete type `C`.
    ///
    /// Succeeds only when the concrete type is exactly `C`.
    #[must_use]
    pub fn downcast_ref<C: Class>(&self) -> Option<&C> {
        (*self.0).as_any().downcast_ref::<C>()
    }

    /// Whether both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &ComponentRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// Number of live handles to this instance.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ComponentRef {}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentRef")
            .field(&self.class().name())
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    enum Tag {}
    struct FormTag;
    struct LoginForm {
        user: String,
    }
    enum Unrelated {}

    component_class!(Tag);
    component_class!(FormTag: Tag);
    component_class!(LoginForm: FormTag);
    component_class!(Unrelated);

    #[test]
    fn class_names_come_from_the_type() {
        assert_eq!(ComponentClass::of::<FormTag>().name(), "FormTag");
        assert_eq!(format!("{}", ComponentClass::of::<LoginForm>()), "LoginForm");
    }

    #[test]
    fn subtype_matches_ancestors_only() {
        let tag = ComponentClass::of::<Tag>();
        let form = ComponentClass::of::<FormTag>();
        let login = ComponentClass::of::<LoginForm>();

        assert!(login.is_a(&login));
        assert!(login.is_a(&form));
        assert!(login.is_a(&tag));
        assert!(!form.is_a(&login));
        assert!(!tag.is_a(&form));
        assert!(!login.is_a(&ComponentClass::of::<Unrelated>()));
    }

    #[test]
    fn ancestry_is_nearest_first() {
        let names: Vec<_> = ComponentClass::of::<LoginForm>()
            .ancestry()
            .map(|class| class.name())
            .collect();
        assert_eq!(names, vec!["LoginForm", "FormTag", "Tag"]);
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = ComponentRef::new(FormTag);
        let b = ComponentRef::new(FormTag);
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(a.handle_count(), 2);
    }

    #[test]
    fn downcast_requires_exact_type() {
        let login = ComponentRef::new(LoginForm {
            user: "ada".to_string(),
        });

        assert_eq!(
            login.downcast_ref::<LoginForm>().map(|l| l.user.as_str()),
            Some("ada")
        );
        assert!(login.downcast_ref::<FormTag>().is_none());
        assert!(login.is_a(&ComponentClass::of::<FormTag>()));
    }
}
