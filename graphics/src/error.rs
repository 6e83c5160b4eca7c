//! Graphics error types.

use thiserror::Error;

use crate::backend::{BackendError, BackendType};
use crate::command::QueueType;
use crate::object::ObjectKind;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// A descriptor failed a precondition. Reported before any backend call.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter or descriptor field.
        name: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// A backend was requested that is not available on this host,
    /// or no backend could be selected at all (`None`).
    #[error("{}", unsupported_backend_message(.0))]
    UnsupportedBackend(Option<BackendType>),
    /// A backend failed to allocate a native object.
    #[error("{backend} backend failed to create {object}: {source}")]
    BackendCreationFailure {
        /// Backend that reported the failure.
        backend: BackendType,
        /// Kind of object being created.
        object: ObjectKind,
        /// Backend-reported context.
        #[source]
        source: BackendError,
    },
    /// A backend operation other than object creation failed.
    #[error("{backend} backend operation failed: {source}")]
    BackendFailure {
        /// Backend that reported the failure.
        backend: BackendType,
        /// Backend-reported context.
        #[source]
        source: BackendError,
    },
    /// A command buffer is already recording for this queue and frame slot.
    #[error("{queue} queue already has a recording command buffer in frame slot {slot}")]
    CommandBufferBusy {
        /// Queue the command buffer belongs to.
        queue: QueueType,
        /// Frame slot index.
        slot: usize,
    },
}

impl GraphicsError {
    /// Shorthand for [`GraphicsError::InvalidArgument`].
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns true if this error was produced by descriptor validation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

fn unsupported_backend_message(backend: &Option<BackendType>) -> String {
    match backend {
        Some(backend) => format!("{backend} backend is not supported on this host"),
        None => "no graphics backend could be selected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::invalid_argument("size", "must be at least 4 bytes, got 3");
        assert_eq!(
            err.to_string(),
            "invalid argument `size`: must be at least 4 bytes, got 3"
        );

        let err = GraphicsError::UnsupportedBackend(Some(BackendType::Metal));
        assert_eq!(err.to_string(), "Metal backend is not supported on this host");

        let err = GraphicsError::UnsupportedBackend(None);
        assert_eq!(err.to_string(), "no graphics backend could be selected");
    }

    #[test]
    fn test_creation_failure_keeps_source() {
        use std::error::Error;

        let err = GraphicsError::BackendCreationFailure {
            backend: BackendType::Vulkan,
            object: ObjectKind::Texture,
            source: BackendError::OutOfMemory,
        };
        assert_eq!(
            err.to_string(),
            "Vulkan backend failed to create texture: out of GPU memory"
        );
        assert!(err.source().is_some());
        assert!(!err.is_invalid_argument());
    }
}
