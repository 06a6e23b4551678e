//! Component signatures for view declarations.
//!
//! A [`Signature`] is the set of component names a view requires. An entity
//! matches a signature when its own component set is a superset of it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::component::{Component, ComponentTypeId};

/// The set of components a view requires.
///
/// Signatures are built once with the builder methods and are immutable
/// afterwards. Two signatures compare equal when they require the same
/// component names, regardless of the order they were added in.
///
/// ```rust
/// use engine_component::{Component, Signature};
///
/// struct Node;
/// impl Component for Node { fn type_name() -> &'static str { "node" } }
/// struct Physics;
/// impl Component for Physics { fn type_name() -> &'static str { "physics" } }
///
/// let a = Signature::new().with::<Node>().with::<Physics>();
/// let b = Signature::new().with::<Physics>().with::<Node>();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    required: BTreeMap<ComponentTypeId, &'static str>,
}

impl Signature {
    /// Create an empty signature. An empty signature matches every live entity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: BTreeMap::new(),
        }
    }

    /// Require component `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_name(T::type_name())
    }

    /// Require the component registered under `name`.
    #[must_use]
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.required.insert(ComponentTypeId::from_name(name), name);
        self
    }

    /// Returns `true` if the signature requires `type_id`.
    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.required.contains_key(&type_id)
    }

    /// Returns `true` if `components` holds every required component.
    #[must_use]
    pub fn is_satisfied_by(&self, components: &BTreeSet<ComponentTypeId>) -> bool {
        self.required.keys().all(|ty| components.contains(ty))
    }

    /// Returns the required component type IDs in ascending order.
    pub fn type_ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.required.keys().copied()
    }

    /// Returns the number of required components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Returns `true` if the signature requires nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.required.values().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}
