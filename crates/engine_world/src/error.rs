//! World error types.

use engine_component::Entity;

/// Errors returned by [`World`](crate::World) operations.
///
/// Both variants are local and recoverable: they describe a caller bug and
/// leave the world unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The entity was destroyed or never created by this world.
    #[error("{0} does not exist")]
    UnknownEntity(Entity),

    /// The entity is alive but does not hold the requested component.
    #[error("component '{component}' not found on {entity}")]
    MissingComponent {
        /// Name of the missing component.
        component: &'static str,
        /// The entity that was queried.
        entity: Entity,
    },
}
