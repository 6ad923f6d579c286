//! # Family Matcher
//!
//! A Family decides which entities a System applies to. It holds three class
//! lists:
//!
//! | List   | Requirement |
//! |--------|-------------|
//! | `all`  | every listed class is matched by at least one component |
//! | `one`  | if non-empty, some listed class is matched by some component |
//! | `none` | no component matches any listed class |
//!
//! A component matches a class when its own class equals it or is a subtype
//! of it. `none` is an absolute veto and is checked first.

use crate::component::{Class, ComponentClass, ComponentRef};
use crate::entity::Entity;
use std::fmt;

/// Class-set predicate over an entity's components.
///
/// Built fluently; each `require_*` call extends its list.
///
/// ```
/// use folio_core::{component_class, ComponentRef, Family};
///
/// struct DatabaseTag;
/// struct ReadOnlyTag;
/// component_class!(DatabaseTag);
/// component_class!(ReadOnlyTag);
///
/// let family = Family::new().all::<DatabaseTag>().none::<ReadOnlyTag>();
///
/// assert!(family.matches(&[ComponentRef::new(DatabaseTag)]));
/// assert!(!family.matches(&[ComponentRef::new(DatabaseTag), ComponentRef::new(ReadOnlyTag)]));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Family {
    all: Vec<ComponentClass>,
    one: Vec<ComponentClass>,
    none: Vec<ComponentClass>,
}

impl Family {
    /// A family with no constraints; it matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require each of `classes` to be matched.
    #[must_use]
    pub fn require_all(mut self, classes: impl IntoIterator<Item = ComponentClass>) -> Self {
        self.all.extend(classes);
        self
    }

    /// Require at least one of `classes` to be matched.
    #[must_use]
    pub fn require_one(mut self, classes: impl IntoIterator<Item = ComponentClass>) -> Self {
        self.one.extend(classes);
        self
    }

    /// Veto any entity where one of `classes` is matched.
    #[must_use]
    pub fn require_none(mut self, classes: impl IntoIterator<Item = ComponentClass>) -> Self {
        self.none.extend(classes);
        self
    }

    /// Shorthand for `require_all([ComponentClass::of::<C>()])`.
    #[must_use]
    pub fn all<C: Class>(self) -> Self {
        self.require_all([ComponentClass::of::<C>()])
    }

    /// Shorthand for `require_one([ComponentClass::of::<C>()])`.
    #[must_use]
    pub fn one<C: Class>(self) -> Self {
        self.require_one([ComponentClass::of::<C>()])
    }

    /// Shorthand for `require_none([ComponentClass::of::<C>()])`.
    #[must_use]
    pub fn none<C: Class>(self) -> Self {
        self.require_none([ComponentClass::of::<C>()])
    }

    /// Classes that must all be matched.
    #[must_use]
    pub fn all_classes(&self) -> &[ComponentClass] {
        &self.all
    }

    /// Classes of which at least one must be matched.
    #[must_use]
    pub fn one_classes(&self) -> &[ComponentClass] {
        &self.one
    }

    /// Vetoed classes.
    #[must_use]
    pub fn none_classes(&self) -> &[ComponentClass] {
        &self.none
    }

    /// Whether this family places no constraint at all.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.all.is_empty() && self.one.is_empty() && self.none.is_empty()
    }

    /// Evaluate the family against a component collection.
    ///
    /// Order of checks: `none` veto, then `one`, then `all`.
    #[must_use]
    pub fn matches(&self, components: &[ComponentRef]) -> bool {
        let matched = |class: &ComponentClass| components.iter().any(|c| c.is_a(class));

        if self.none.iter().any(matched) {
            return false;
        }

        if !self.one.is_empty() && !self.one.iter().any(matched) {
            return false;
        }

        self.all.iter().all(matched)
    }

    /// Evaluate the family against an entity's components.
    #[must_use]
    pub fn matches_entity(&self, entity: &Entity) -> bool {
        self.matches(entity.components())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, classes: &[ComponentClass]) -> fmt::Result {
    write!(f, "{label}: [")?;
    for (i, class) in classes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(class.name())?;
    }
    f.write_str("]")
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        write_list(f, "all", &self.all)?;
        f.write_str(", ")?;
        write_list(f, "one", &self.one)?;
        f.write_str(", ")?;
        write_list(f, "none", &self.none)?;
        f.write_str("}")
    }
}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Family{self}")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_class;

    struct DatabaseTag;
    struct ReadOnlyTag;
    struct FormTag;
    struct LoginForm;
    struct NavTag;

    component_class!(DatabaseTag);
    component_class!(ReadOnlyTag);
    component_class!(FormTag);
    component_class!(LoginForm: FormTag);
    component_class!(NavTag);

    fn page(components: Vec<ComponentRef>) -> Entity {
        let mut entity = Entity::new("/test");
        for component in components {
            entity.attach(component);
        }
        entity
    }

    #[test]
    fn unconstrained_family_matches_everything() {
        let family = Family::new();
        assert!(family.is_unconstrained());
        assert!(family.matches(&[]));
        assert!(family.matches(&[ComponentRef::new(NavTag)]));
    }

    #[test]
    fn none_vetoes_even_when_all_and_one_hold() {
        let family = Family::new()
            .all::<DatabaseTag>()
            .one::<FormTag>()
            .none::<ReadOnlyTag>();

        let ok = page(vec![ComponentRef::new(DatabaseTag), ComponentRef::new(FormTag)]);
        let vetoed = page(vec![
            ComponentRef::new(DatabaseTag),
            ComponentRef::new(FormTag),
            ComponentRef::new(ReadOnlyTag),
        ]);

        assert!(family.matches_entity(&ok));
        assert!(!family.matches_entity(&vetoed));
    }

    #[test]
    fn none_veto_applies_to_subtypes() {
        let family = Family::new().none::<FormTag>();
        assert!(!family.matches(&[ComponentRef::new(LoginForm)]));
    }

    #[test]
    fn empty_one_is_vacuous() {
        let family = Family::new().all::<NavTag>();
        assert!(family.matches(&[ComponentRef::new(NavTag)]));
    }

    #[test]
    fn one_needs_any_single_class() {
        let family = Family::new().one::<FormTag>().one::<NavTag>();

        assert!(family.matches(&[ComponentRef::new(NavTag)]));
        assert!(family.matches(&[ComponentRef::new(LoginForm)]));
        assert!(!family.matches(&[ComponentRef::new(DatabaseTag)]));
        assert!(!family.matches(&[]));
    }

    #[test]
    fn all_needs_every_class() {
        let family = Family::new().all::<DatabaseTag>().all::<NavTag>();

        assert!(!family.matches(&[ComponentRef::new(DatabaseTag)]));
        assert!(family.matches(&[ComponentRef::new(NavTag), ComponentRef::new(DatabaseTag)]));
    }

    #[test]
    fn subclass_satisfies_parent_but_not_reverse() {
        let wants_form = Family::new().all::<FormTag>();
        let wants_login = Family::new().all::<LoginForm>();

        assert!(wants_form.matches(&[ComponentRef::new(LoginForm)]));
        assert!(!wants_login.matches(&[ComponentRef::new(FormTag)]));
    }

    #[test]
    fn builder_calls_extend_lists() {
        let family = Family::new()
            .require_all([ComponentClass::of::<DatabaseTag>()])
            .require_all([ComponentClass::of::<NavTag>(), ComponentClass::of::<FormTag>()]);

        assert_eq!(family.all_classes().len(), 3);
        assert!(family.one_classes().is_empty());
        assert!(family.none_classes().is_empty());
    }

    #[test]
    fn display_lists_all_three() {
        let family = Family::new()
            .all::<DatabaseTag>()
            .none::<ReadOnlyTag>()
            .none::<LoginForm>();
        assert_eq!(
            family.to_string(),
            "{all: [DatabaseTag], one: [], none: [ReadOnlyTag, LoginForm]}"
        );
    }
}
