//! In-memory topology
//!
//! Useful when an inventory of bus devices is already at hand, for replaying
//! a captured topology, and for exercising the enumerator without hardware.

use super::{BusDevice, TopologySession, TopologySource};
use crate::error::{EnumerationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Device name entry, keyed by vendor and device identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceName {
    /// PCI vendor identifier
    pub vendor_id: u16,
    /// PCI device identifier
    pub device_id: u16,
    /// Human-readable name
    pub name: String,
}

/// A fixed topology held in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotTopology {
    /// Devices in enumeration order
    pub devices: Vec<BusDevice>,
    /// Vendor names keyed by vendor identifier
    #[serde(default)]
    pub vendors: BTreeMap<u16, String>,
    /// Device names
    #[serde(default)]
    pub device_names: Vec<DeviceName>,
    /// When set, `open` fails with this message
    #[serde(skip)]
    unavailable: Option<String>,
}

impl SnapshotTopology {
    /// Topology containing the given devices and no names
    pub fn new(devices: Vec<BusDevice>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Topology that cannot be opened
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Register a vendor name
    pub fn with_vendor(mut self, vendor_id: u16, name: impl Into<String>) -> Self {
        self.vendors.insert(vendor_id, name.into());
        self
    }

    /// Register a device name
    pub fn with_device_name(mut self, vendor_id: u16, device_id: u16, name: impl Into<String>) -> Self {
        self.device_names.push(DeviceName {
            vendor_id,
            device_id,
            name: name.into(),
        });
        self
    }

    /// Append a device
    pub fn push(&mut self, device: BusDevice) {
        self.devices.push(device);
    }

    /// Read a topology from a JSON file
    pub fn load_json(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(EnumerationError::Io)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the topology as pretty JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(EnumerationError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl TopologySource for SnapshotTopology {
    fn open(&self) -> Result<Box<dyn TopologySession>> {
        if let Some(reason) = &self.unavailable {
            return Err(EnumerationError::TopologyUnavailable(reason.clone()));
        }
        Ok(Box::new(SnapshotSession {
            topology: self.clone(),
        }))
    }
}

struct SnapshotSession {
    topology: SnapshotTopology,
}

impl TopologySession for SnapshotSession {
    fn scan(&mut self) -> Result<Vec<BusDevice>> {
        Ok(self.topology.devices.clone())
    }

    fn vendor_name(&self, vendor_id: u16) -> Option<String> {
        self.topology.vendors.get(&vendor_id).cloned()
    }

    fn device_name(&self, vendor_id: u16, device_id: u16) -> Option<String> {
        self.topology
            .device_names
            .iter()
            .find(|d| d.vendor_id == vendor_id && d.device_id == device_id)
            .map(|d| d.name.clone())
    }
}
