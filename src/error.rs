use thiserror::Error;

/// Errors raised by [`ScrollNavigator`](crate::ScrollNavigator) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// The host has not attached its accessors yet, or they were released.
    #[error("accessors not ready")]
    AccessorsNotReady,
}
