/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{DescriptorId, InlineString, NativeCode};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export subsystem errors so callers only need `core::errors`
pub use crate::acquire::AcquireError;
pub use crate::registry::RegistryError;

/// Bridge operation result
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Unified bridge error type with miette diagnostics
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error", content = "details", rename_all = "snake_case")]
pub enum BridgeError {
    #[error("Acquisition failed: {0}")]
    #[diagnostic(transparent)]
    Acquire(#[from] AcquireError),

    #[error("Registry error: {0}")]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to read metadata of descriptor {descriptor} (errno {code})")]
    #[diagnostic(
        code(bridge::io_error),
        help("The native resource behind this descriptor could not be queried.")
    )]
    Io {
        descriptor: DescriptorId,
        code: NativeCode,
    },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(bridge::configuration_error),
        help("Review BRIDGE_* environment variables and the configuration file.")
    )]
    Configuration(InlineString),
}

impl BridgeError {
    /// Create a configuration error
    #[inline]
    pub fn configuration(msg: impl Into<InlineString>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Native errno behind this error, if it came from an OS call
    pub fn native_code(&self) -> Option<NativeCode> {
        match self {
            BridgeError::Acquire(e) => e.native_code(),
            BridgeError::Io { code, .. } => Some(*code),
            BridgeError::Registry(_) | BridgeError::Configuration(_) => None,
        }
    }
}
