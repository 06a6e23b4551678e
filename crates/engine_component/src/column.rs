//! Typed component columns.
//!
//! Each component name is stored in its own [`Column`]: a sparse set with a
//! dense value array, a parallel entity array, and an entity → row index.
//! Removal swap-removes the row so the dense arrays stay packed.

use std::any::Any;
use std::collections::HashMap;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;

/// Type-erased access to a [`Column`], used by the world to drop components
/// without knowing their concrete type.
pub trait AnyColumn: Any {
    /// The component type stored in this column.
    fn component_type(&self) -> ComponentTypeId;

    /// Returns `true` if `entity` has a value in this column.
    fn contains(&self, entity: Entity) -> bool;

    /// Remove and drop the value for `entity`. Returns `true` if a value was present.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for all values of one component type.
#[derive(Debug)]
pub struct Column<T> {
    type_id: ComponentTypeId,
    /// `entities[i]` owns `values[i]`.
    entities: Vec<Entity>,
    values: Vec<T>,
    rows: HashMap<Entity, usize>,
}

impl<T: Component> Column<T> {
    /// Create an empty column for `T`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_id: T::component_type_id(),
            entities: Vec::new(),
            values: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Insert a value for `entity`, returning the previous value if any.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&row) = self.rows.get(&entity) {
            return Some(std::mem::replace(&mut self.values[row], value));
        }
        self.rows.insert(entity, self.values.len());
        self.entities.push(entity);
        self.values.push(value);
        None
    }

    /// Remove the value for `entity`, returning it.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.rows.remove(&entity)?;
        self.entities.swap_remove(row);
        let value = self.values.swap_remove(row);
        if let Some(&moved) = self.entities.get(row) {
            self.rows.insert(moved, row);
        }
        Some(value)
    }

    /// The value stored for `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.rows.get(&entity).map(|&row| &self.values[row])
    }

    /// Mutable access to the stored value.
    #[must_use]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.rows.get(&entity).map(|&row| &mut self.values[row])
    }

    /// Iterate `(entity, value)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }
}

impl<T: Component> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> AnyColumn for Column<T> {
    fn component_type(&self) -> ComponentTypeId {
        self.type_id
    }

    fn contains(&self, entity: Entity) -> bool {
        self.rows.contains_key(&entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Speed(f32);

    impl Component for Speed {
        fn type_name() -> &'static str {
            "speed"
        }
    }

    struct DropCounter(Rc<Cell<u32>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl Component for DropCounter {
        fn type_name() -> &'static str {
            "dropCounter"
        }
    }

    #[test]
    fn test_insert_get_replace() {
        let mut col = Column::<Speed>::new();
        let e = Entity::from_raw(1);
        assert!(col.insert(e, Speed(1.0)).is_none());
        assert_eq!(col.get(e), Some(&Speed(1.0)));
        assert_eq!(col.insert(e, Speed(2.0)), Some(Speed(1.0)));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn test_swap_remove_keeps_rows_consistent() {
        let mut col = Column::<Speed>::new();
        for i in 1..=4 {
            col.insert(Entity::from_raw(i), Speed(i as f32));
        }
        assert_eq!(col.remove(Entity::from_raw(2)), Some(Speed(2.0)));
        // Entity 4 moved into row 1; lookups must still resolve.
        assert_eq!(col.get(Entity::from_raw(4)), Some(&Speed(4.0)));
        assert_eq!(col.get(Entity::from_raw(3)), Some(&Speed(3.0)));
        assert!(col.get(Entity::from_raw(2)).is_none());
        assert_eq!(col.iter().count(), 3);
    }

    #[test]
    fn test_erased_remove_drops_value() {
        let drops = Rc::new(Cell::new(0));
        let mut col = Column::<DropCounter>::new();
        col.insert(Entity::from_raw(1), DropCounter(drops.clone()));

        let erased: &mut dyn AnyColumn = &mut col;
        assert!(erased.contains(Entity::from_raw(1)));
        assert!(erased.remove_entity(Entity::from_raw(1)));
        assert!(!erased.remove_entity(Entity::from_raw(1)));
        assert_eq!(drops.get(), 1);
        assert!(erased.is_empty());
    }

    #[test]
    fn test_downcast_through_any() {
        let mut col = Column::<Speed>::new();
        col.insert(Entity::from_raw(9), Speed(3.0));
        let erased: &dyn AnyColumn = &col;
        assert_eq!(erased.component_type(), ComponentTypeId::from_name("speed"));
        let typed = erased.as_any().downcast_ref::<Column<Speed>>().unwrap();
        assert_eq!(typed.get(Entity::from_raw(9)), Some(&Speed(3.0)));
    }
}
