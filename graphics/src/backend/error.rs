//! Backend error types.

use thiserror::Error;

/// Errors reported by backend implementations.
///
/// The device wraps these into [`GraphicsError`](crate::GraphicsError) together
/// with the backend type and the object being created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// The backend does not implement the requested operation.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// A native API call failed.
    #[error("native call failed: {0}")]
    Native(String),
}

impl BackendError {
    /// Shorthand for [`BackendError::Native`].
    pub fn native(message: impl Into<String>) -> Self {
        Self::Native(message.into())
    }
}
