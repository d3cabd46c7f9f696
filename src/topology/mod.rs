//! Hardware topology sources
//!
//! A topology source enumerates the devices attached to the PCI bus and
//! resolves human-readable names for vendor/device identifier pairs.
//! Opening a source yields a [`TopologySession`]: the scoped handle for a
//! single scan. The handle is released when the session is dropped.

pub mod snapshot;
#[cfg(feature = "sysfs")]
pub mod sysfs;

pub use snapshot::SnapshotTopology;
#[cfg(feature = "sysfs")]
pub use sysfs::SysfsTopology;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A device reported by the topology source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusDevice {
    /// Bus address (e.g. "0000:01:00.0") if the source knows it
    #[serde(default)]
    pub address: Option<String>,
    /// PCI vendor identifier
    pub vendor_id: u16,
    /// PCI device identifier
    pub device_id: u16,
    /// 16-bit class code (base class and subclass)
    pub device_class: u16,
}

impl BusDevice {
    /// Create a device without a bus address
    pub fn new(vendor_id: u16, device_id: u16, device_class: u16) -> Self {
        Self {
            address: None,
            vendor_id,
            device_id,
            device_class,
        }
    }

    /// Attach a bus address
    pub fn at(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A platform facility that can be opened for a scan
#[cfg_attr(test, mockall::automock)]
pub trait TopologySource {
    /// Acquire a scan handle.
    ///
    /// Fails with [`EnumerationError::TopologyUnavailable`](crate::EnumerationError::TopologyUnavailable)
    /// when the source cannot be reached.
    fn open(&self) -> Result<Box<dyn TopologySession>>;
}

/// An open scan handle
#[cfg_attr(test, mockall::automock)]
pub trait TopologySession {
    /// Snapshot the bus, in the order the source reports devices
    fn scan(&mut self) -> Result<Vec<BusDevice>>;

    /// Vendor name from the source's name database
    fn vendor_name(&self, vendor_id: u16) -> Option<String>;

    /// Device name from the source's name database
    fn device_name(&self, vendor_id: u16, device_id: u16) -> Option<String>;
}
