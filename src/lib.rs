//! # GPUSCAN - Display Device Enumeration
//!
//! A lightweight Rust library that lists the graphics controllers attached
//! to the PCI bus and describes each one as `"<vendor> <device>"`.
//!
//! ## Features
//!
//! - **Display-class filtering**: VGA, XGA, 3D and other display controllers
//! - **Pluggable vendor labels**: full names from the PCI ID database or short built-in labels
//! - **Bounded results** with an explicit signal when devices are left out
//! - **Scoped topology handles** released on every return path
//! - **JSON export** of scan results
//! - **No root required**: reads sysfs; the PCI ID database is compiled in
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = gpuscan::enumerate_display_devices()?;
//!     for gpu in &result.records {
//!         println!("GPU: {}", gpu);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod class;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod topology;
pub mod vendors;

// Re-export main API for easy access
#[cfg(feature = "sysfs")]
pub use api::{enumerate_display_devices, enumerate_display_devices_with};
pub use api::{DisplayDeviceRecord, EnumerationResult, NameField, ScanWarning};
pub use class::{DisplayClass, DISPLAY_CLASS_CODES};
pub use config::{EnumeratorConfig, MAX_RESULTS, UNKNOWN_DEVICE, UNKNOWN_VENDOR};
pub use enumerator::DeviceEnumerator;
pub use error::{EnumerationError, Result};
#[cfg(feature = "sysfs")]
pub use topology::SysfsTopology;
pub use topology::{BusDevice, SnapshotTopology, TopologySession, TopologySource};
pub use vendors::{identify_vendor, KnownVendor, VendorLabelStrategy, VendorLabeler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick compatibility check
///
/// Returns `true` if at least one display device can be found on this system.
///
/// # Example
///
/// ```no_run
/// if gpuscan::is_supported() {
///     println!("System has a display controller");
/// } else {
///     println!("No display controller detected");
/// }
/// ```
#[cfg(feature = "sysfs")]
pub fn is_supported() -> bool {
    enumerate_display_devices()
        .map(|result| !result.is_empty())
        .unwrap_or(false)
}

/// Get library information
///
/// # Example
///
/// ```no_run
/// println!("Using gpuscan v{}", gpuscan::version());
/// ```
pub fn version() -> &'static str {
    VERSION
}


/// Prelude module for convenient imports
///
/// # Example
///
/// ```no_run
/// use gpuscan::prelude::*;
///
/// let result = enumerate_display_devices()?;
/// # Ok::<(), EnumerationError>(())
/// ```
pub mod prelude {
    #[cfg(feature = "sysfs")]
    pub use crate::api::{enumerate_display_devices, enumerate_display_devices_with};
    pub use crate::api::{DisplayDeviceRecord, EnumerationResult, ScanWarning};
    pub use crate::config::EnumeratorConfig;
    pub use crate::enumerator::DeviceEnumerator;
    pub use crate::error::EnumerationError;
    pub use crate::topology::{BusDevice, SnapshotTopology, TopologySource};
    #[cfg(feature = "sysfs")]
    pub use crate::topology::SysfsTopology;
    #[cfg(feature = "sysfs")]
    pub use crate::is_supported;
    pub use crate::version;
}
