//! Error types for the Galaxy3D GPU layer
//!
//! This module defines the error types used throughout the crate,
//! including device failures, contract violations and property lookups.

use std::fmt;
use crate::device::DeviceResourceError;

/// Result type for Galaxy3D GPU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D GPU errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (context, device, subsystems)
    InitializationFailed(String),

    /// The device backend could not create or update a resource.
    ///
    /// Recoverable: callers may free resources (e.g. pooled framebuffers)
    /// and retry.
    DeviceResource(DeviceResourceError),

    /// A caller broke an API contract (out-of-range write, missing
    /// buffer slot, bad attachment index, ...)
    ContractViolation(String),

    /// A named property is not declared by the shader
    PropertyNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DeviceResource(err) => write!(f, "Device resource error: {}", err),
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::PropertyNotFound(name) => write!(f, "Property not found: {}", name),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeviceResource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DeviceResourceError> for Error {
    fn from(err: DeviceResourceError) -> Self {
        Error::DeviceResource(err)
    }
}

// ===== ERROR MACROS =====

/// Log an ERROR and build an `Error::BackendError` with the same message
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(Error::BackendError)` from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Log an ERROR and build an `Error::ContractViolation` with the same message
#[macro_export]
macro_rules! engine_contract {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::ContractViolation(message)
    }};
}

/// Log an ERROR and return `Err(Error::ContractViolation)` from the current function
#[macro_export]
macro_rules! engine_contract_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_contract!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
