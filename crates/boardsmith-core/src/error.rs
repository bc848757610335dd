//! Errors raised by structural misuse of the scene graph.

use crate::element::ElementId;
use thiserror::Error;

/// Structural precondition violations.
///
/// Drop refusals and empty gestures are negotiated outcomes and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Element {child} is not a child of {parent}")]
    NotAChild { parent: ElementId, child: ElementId },
    #[error("Element {0} is not a container")]
    NotAContainer(ElementId),
    #[error("Cannot attach {child} under itself or its descendant {parent}")]
    Cycle { parent: ElementId, child: ElementId },
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
