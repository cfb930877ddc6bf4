//! Error types for the room layer.

/// Errors that can occur when talking to the room actor.
///
/// Game-rule rejections (wrong turn, occupied cell, queue full, kicking
/// the AI) are not errors — the actor answers those with a notice or
/// ignores them, and the match stays valid either way.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room's command channel is closed — the actor has shut down.
    #[error("room is unavailable")]
    Unavailable,
}
