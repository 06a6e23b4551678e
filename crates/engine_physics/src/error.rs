//! Physics-layer error types.

use crate::types::{BodyId, CharacterId};

/// Errors reported by a [`PhysicsWorld`](crate::PhysicsWorld).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// The backend could not build a character or body.
    #[error("failed to create {resource}: {reason}")]
    ResourceInit {
        /// What was being created (`"character"`, `"body"`).
        resource: &'static str,
        reason: String,
    },

    /// The character handle was never issued or has been destroyed.
    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),

    /// The body handle was never issued or has been destroyed.
    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    /// The shared physics world was already borrowed by someone else.
    #[error("physics world is already borrowed")]
    Busy,
}
