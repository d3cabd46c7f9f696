//! High-level API for display device enumeration

#[cfg(feature = "sysfs")]
use crate::config::EnumeratorConfig;
#[cfg(feature = "sysfs")]
use crate::enumerator::DeviceEnumerator;
use crate::error::{EnumerationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// A display device described as `"<vendor> <device>"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDeviceRecord {
    /// Formatted vendor and device name
    pub description: String,
    /// PCI vendor identifier
    pub vendor_id: u16,
    /// PCI device identifier
    pub device_id: u16,
    /// 16-bit class code
    pub device_class: u16,
    /// Bus address, if the topology source reported one
    pub address: Option<String>,
}

impl fmt::Display for DisplayDeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Which name lookup fell back to a sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameField {
    /// Vendor label
    Vendor,
    /// Device name
    Device,
}

/// Non-fatal conditions raised during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// A name could not be resolved and was replaced by a sentinel
    NameResolutionFailed {
        /// PCI vendor identifier
        vendor_id: u16,
        /// PCI device identifier
        device_id: u16,
        /// The name that was missing
        field: NameField,
    },
    /// More display devices were found than the result can hold
    CapacityExceeded {
        /// Configured capacity
        capacity: usize,
        /// Number of display devices left out
        dropped: usize,
    },
}

/// Outcome of a single scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationResult {
    /// Records in enumeration order
    pub records: Vec<DisplayDeviceRecord>,
    /// Display devices dropped because the capacity was reached
    pub dropped: usize,
    /// Non-fatal conditions seen while scanning
    pub warnings: Vec<ScanWarning>,
}

impl EnumerationResult {
    /// Number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// True when no display device was found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when display devices were left out because of the capacity
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Formatted descriptions, in enumeration order
    pub fn descriptions(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.description.as_str()).collect()
    }

    /// Fail if any name had to be replaced by a sentinel
    pub fn strict(self) -> Result<Self> {
        let unresolved = self.warnings.iter().find_map(|w| match w {
            ScanWarning::NameResolutionFailed { vendor_id, device_id, .. } => {
                Some((*vendor_id, *device_id))
            }
            _ => None,
        });
        match unresolved {
            Some((vendor_id, device_id)) => {
                Err(EnumerationError::NameResolutionFailed { vendor_id, device_id })
            }
            None => Ok(self),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Export the result to a JSON file
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(EnumerationError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Enumerate display devices on this machine with the default configuration
///
/// This is the main entry point for most applications.
#[cfg(feature = "sysfs")]
pub fn enumerate_display_devices() -> Result<EnumerationResult> {
    enumerate_display_devices_with(&EnumeratorConfig::default())
}

/// Enumerate display devices on this machine with a specific configuration
#[cfg(feature = "sysfs")]
pub fn enumerate_display_devices_with(config: &EnumeratorConfig) -> Result<EnumerationResult> {
    let topology = crate::topology::SysfsTopology::from_config(config);
    DeviceEnumerator::new(config.clone())?.enumerate(&topology)
}
