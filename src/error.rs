//! Error types for the gpuscan library

use std::io;
use thiserror::Error;

/// Main error type for gpuscan operations
#[derive(Error, Debug)]
pub enum EnumerationError {
    /// The hardware topology source could not be opened or scanned
    #[error("Topology unavailable: {0}")]
    TopologyUnavailable(String),

    /// Vendor or device name could not be resolved
    #[error("Name resolution failed for {vendor_id:04x}:{device_id:04x}")]
    NameResolutionFailed {
        /// PCI vendor identifier
        vendor_id: u16,
        /// PCI device identifier
        device_id: u16,
    },

    /// Invalid parameter or configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O failure outside the topology source (config files, exports)
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnumerationError {
    /// Wrap an I/O error raised while opening or reading the topology source
    pub fn topology(context: impl AsRef<str>, err: io::Error) -> Self {
        EnumerationError::TopologyUnavailable(format!("{}: {}", context.as_ref(), err))
    }
}

/// Result type for gpuscan operations
pub type Result<T> = std::result::Result<T, EnumerationError>;
