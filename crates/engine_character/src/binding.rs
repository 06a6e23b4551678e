//! Scoped ownership of a physics character.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use engine_math::{Quat, Vec3};
use engine_physics::{
    CharacterFilters, CharacterId, CharacterSettings, ExtendedUpdateSettings, ObjectLayer, PhysicsError,
    SharedPhysics,
};
use tracing::{debug, warn};

/// Characters whose release found the physics world borrowed. They are
/// destroyed by the next [`flush`](Self::flush).
#[derive(Debug, Clone, Default)]
pub struct PendingReleases(Rc<RefCell<Vec<CharacterId>>>);

impl PendingReleases {
    /// Characters waiting to be destroyed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` when there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn push(&self, id: CharacterId) {
        self.0.borrow_mut().push(id);
    }

    /// Destroy every queued character. Returns how many were released.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Busy`] if the physics world is still
    /// borrowed. The queue is kept for the next attempt.
    pub fn flush(&self, physics: &SharedPhysics) -> Result<usize, PhysicsError> {
        if self.is_empty() {
            return Ok(0);
        }
        let mut physics = physics.try_borrow_mut().map_err(|_| PhysicsError::Busy)?;
        let queued = std::mem::take(&mut *self.0.borrow_mut());
        for &id in &queued {
            match physics.destroy_character(id) {
                Ok(()) => debug!(character = %id, "released deferred character"),
                Err(error) => warn!(character = %id, %error, "deferred character release failed"),
            }
        }
        Ok(queued.len())
    }
}

/// A physics character plus the filters and step settings cached for it.
///
/// Creating a binding creates the character; dropping it destroys the
/// character. A binding is never cloned, so the character is released
/// exactly once. If the physics world is borrowed at that moment the
/// release waits in the binding's [`PendingReleases`].
pub struct CharacterBinding {
    physics: SharedPhysics,
    releases: PendingReleases,
    id: CharacterId,
    filters: CharacterFilters,
    update_settings: ExtendedUpdateSettings,
}

impl CharacterBinding {
    /// Create a character in `physics` sweeping as a moving object.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::ResourceInit`] if the backend rejects the
    /// settings or the physics world is already borrowed.
    pub fn acquire(
        physics: &SharedPhysics,
        releases: &PendingReleases,
        settings: &CharacterSettings,
        position: Vec3,
        rotation: Quat,
    ) -> Result<Self, PhysicsError> {
        let id = physics
            .try_borrow_mut()
            .map_err(|_| PhysicsError::ResourceInit {
                resource: "character",
                reason: "physics world is borrowed".to_owned(),
            })?
            .create_character(settings, position, rotation)?;
        debug!(character = %id, ?position, "bound character");

        Ok(Self {
            physics: physics.clone(),
            releases: releases.clone(),
            id,
            filters: CharacterFilters::for_layer(ObjectLayer::MOVING),
            update_settings: ExtendedUpdateSettings::default(),
        })
    }

    /// Handle of the owned physics character.
    #[must_use]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// What the character's sweeps collide with.
    #[must_use]
    pub fn filters(&self) -> &CharacterFilters {
        &self.filters
    }

    /// Step-up and stick-to-floor settings for each sweep.
    #[must_use]
    pub fn update_settings(&self) -> &ExtendedUpdateSettings {
        &self.update_settings
    }
}

impl Drop for CharacterBinding {
    fn drop(&mut self) {
        let Ok(mut physics) = self.physics.try_borrow_mut() else {
            debug!(character = %self.id, "physics world borrowed, release deferred");
            self.releases.push(self.id);
            return;
        };
        match physics.destroy_character(self.id) {
            Ok(()) => debug!(character = %self.id, "released character"),
            Err(error) => warn!(character = %self.id, %error, "character release failed"),
        }
    }
}

impl fmt::Debug for CharacterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterBinding")
            .field("id", &self.id)
            .field("filters", &self.filters)
            .field("update_settings", &self.update_settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use engine_physics::HeadlessPhysics;

    use super::*;

    #[test]
    fn test_drop_releases_character() {
        let headless = Rc::new(RefCell::new(HeadlessPhysics::default()));
        let physics: SharedPhysics = headless.clone();

        let binding = CharacterBinding::acquire(
            &physics,
            &PendingReleases::default(),
            &CharacterSettings::capsule(3.0, 1.0),
            Vec3::ZERO,
            Quat::IDENTITY,
        )
        .unwrap();
        assert_eq!(headless.borrow().character_count(), 1);

        drop(binding);
        assert_eq!(headless.borrow().character_count(), 0);
    }

    #[test]
    fn test_release_while_borrowed_is_deferred() {
        let headless = Rc::new(RefCell::new(HeadlessPhysics::default()));
        let physics: SharedPhysics = headless.clone();
        let releases = PendingReleases::default();

        let binding = CharacterBinding::acquire(
            &physics,
            &releases,
            &CharacterSettings::capsule(3.0, 1.0),
            Vec3::ZERO,
            Quat::IDENTITY,
        )
        .unwrap();

        {
            let _guard = headless.borrow();
            drop(binding);
            assert_eq!(releases.len(), 1);
            assert_eq!(releases.flush(&physics), Err(PhysicsError::Busy));
        }
        assert_eq!(headless.borrow().character_count(), 1);

        assert_eq!(releases.flush(&physics), Ok(1));
        assert!(releases.is_empty());
        assert_eq!(headless.borrow().character_count(), 0);
        assert_eq!(releases.flush(&physics), Ok(0));
    }

    #[test]
    fn test_acquire_while_borrowed_fails_cleanly() {
        let physics: SharedPhysics = Rc::new(RefCell::new(HeadlessPhysics::default()));
        let _guard = physics.borrow();
        let err = CharacterBinding::acquire(
            &physics,
            &PendingReleases::default(),
            &CharacterSettings::capsule(3.0, 1.0),
            Vec3::ZERO,
            Quat::IDENTITY,
        )
        .unwrap_err();
        assert!(matches!(err, PhysicsError::ResourceInit { .. }));
    }
}
