//! Level loading errors

use std::fmt;

use crate::scene::SceneError;

/// Error building a playable level from a scene
#[derive(Debug)]
pub enum LevelError {
    /// The underlying scene failed to load or instantiate
    Scene(SceneError),
    /// A second start sphere was found
    DuplicateSphere { level: String },
    /// No start sphere was found
    MissingSphere { level: String },
    /// A game mode needs a camera the level does not have
    MissingCamera { level: String },
    /// A mesh instance names a mesh the buffer does not contain
    UnknownMesh { level: String, mesh: String },
    /// A mesh collider's mesh is not a triangle list
    InvalidPrimitive { level: String, mesh: String },
    /// A `Ball.N` mesh with N outside 1..=15
    BadBallIndex { level: String, mesh: String },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Scene(e) => write!(f, "Scene error: {}", e),
            LevelError::DuplicateSphere { level } => {
                write!(f, "Level '{}' contains more than one Sphere (starting location)", level)
            }
            LevelError::MissingSphere { level } => {
                write!(f, "Level '{}' contains no Sphere (starting location)", level)
            }
            LevelError::MissingCamera { level } => write!(f, "Level '{}' is missing a camera", level),
            LevelError::UnknownMesh { level, mesh } => {
                write!(f, "Level '{}' uses unknown mesh '{}'", level, mesh)
            }
            LevelError::InvalidPrimitive { level, mesh } => {
                write!(f, "Level '{}' uses mesh '{}' as a collider but it is not a triangle list", level, mesh)
            }
            LevelError::BadBallIndex { level, mesh } => {
                write!(f, "Level '{}' has ball '{}' with invalid index", level, mesh)
            }
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Scene(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SceneError> for LevelError {
    fn from(e: SceneError) -> Self {
        LevelError::Scene(e)
    }
}
