//! Linux sysfs topology source
//!
//! Devices come from `/sys/bus/pci/devices/<address>/{vendor,device,class}`,
//! names from the PCI ID database compiled in by the `pci-ids` crate.

use super::{BusDevice, TopologySession, TopologySource};
use crate::class::class_from_sysfs;
use crate::config::EnumeratorConfig;
use crate::error::{EnumerationError, Result};
use pci_ids::FromId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default location of the PCI device directory
pub const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";

/// Topology source backed by sysfs
#[derive(Debug, Clone)]
pub struct SysfsTopology {
    root: PathBuf,
}

impl Default for SysfsTopology {
    fn default() -> Self {
        Self {
            root: PathBuf::from(SYSFS_PCI_DEVICES),
        }
    }
}

impl SysfsTopology {
    /// Source reading from a custom device directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build a source from the paths in a configuration
    pub fn from_config(config: &EnumeratorConfig) -> Self {
        match &config.sysfs_root {
            Some(root) => Self::with_root(root),
            None => Self::default(),
        }
    }

    /// Device directory this source reads
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TopologySource for SysfsTopology {
    fn open(&self) -> Result<Box<dyn TopologySession>> {
        if !self.root.is_dir() {
            return Err(EnumerationError::TopologyUnavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        log::debug!("Opened sysfs topology at {}", self.root.display());

        Ok(Box::new(SysfsSession {
            root: self.root.clone(),
        }))
    }
}

/// Open sysfs scan handle
struct SysfsSession {
    root: PathBuf,
}

impl TopologySession for SysfsSession {
    fn scan(&mut self) -> Result<Vec<BusDevice>> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| EnumerationError::topology(self.root.display().to_string(), e))?;

        let mut addresses = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EnumerationError::topology("reading device entry", e))?;
            addresses.push(entry.file_name().to_string_lossy().into_owned());
        }
        // readdir order is unspecified; bus address order is what lspci shows
        addresses.sort();

        let mut devices = Vec::with_capacity(addresses.len());
        for address in addresses {
            match read_device(&self.root.join(&address)) {
                Ok(device) => devices.push(device.at(address)),
                Err(e) => log::warn!("Skipping PCI device {}: {}", address, e),
            }
        }

        Ok(devices)
    }

    fn vendor_name(&self, vendor_id: u16) -> Option<String> {
        pci_ids::Vendor::from_id(vendor_id).map(|v| v.name().to_string())
    }

    fn device_name(&self, vendor_id: u16, device_id: u16) -> Option<String> {
        pci_ids::Device::from_vid_pid(vendor_id, device_id).map(|d| d.name().to_string())
    }
}

fn read_device(path: &Path) -> io::Result<BusDevice> {
    let vendor_id = read_hex_u16(path, "vendor")?;
    let device_id = read_hex_u16(path, "device")?;
    let class = read_hex_u32(path, "class")?;

    Ok(BusDevice::new(vendor_id, device_id, class_from_sysfs(class)))
}

/// Read an attribute such as `0x10de`, trimmed of the `0x` prefix
fn read_hex_attr(path: &Path, attr: &str) -> io::Result<String> {
    let value = fs::read_to_string(path.join(attr))?;
    Ok(value.trim().trim_start_matches("0x").to_string())
}

fn invalid_hex(attr: &str, value: &str, err: std::num::ParseIntError) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{} = {:?}: {}", attr, value, err),
    )
}

fn read_hex_u16(path: &Path, attr: &str) -> io::Result<u16> {
    let value = read_hex_attr(path, attr)?;
    u16::from_str_radix(&value, 16).map_err(|e| invalid_hex(attr, &value, e))
}

fn read_hex_u32(path: &Path, attr: &str) -> io::Result<u32> {
    let value = read_hex_attr(path, attr)?;
    u32::from_str_radix(&value, 16).map_err(|e| invalid_hex(attr, &value, e))
}
