//! Enumerator configuration

use crate::error::{EnumerationError, Result};
use crate::vendors::VendorLabelStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default cap on the number of records returned by a scan
pub const MAX_RESULTS: usize = 512;

/// Vendor label used when a vendor cannot be resolved
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Device label used when a device cannot be resolved
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Enumeration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// Maximum number of records per scan
    pub max_results: usize,
    /// Where vendor labels come from
    pub vendor_labels: VendorLabelStrategy,
    /// Sentinel for unresolved vendors
    pub unknown_vendor: String,
    /// Sentinel for unresolved devices
    pub unknown_device: String,
    /// Class codes accepted in addition to the display classes
    pub extra_class_codes: Vec<u16>,
    /// Override for the sysfs PCI device directory
    pub sysfs_root: Option<PathBuf>,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            vendor_labels: VendorLabelStrategy::Topology,
            unknown_vendor: UNKNOWN_VENDOR.to_string(),
            unknown_device: UNKNOWN_DEVICE.to_string(),
            extra_class_codes: Vec::new(),
            sysfs_root: None,
        }
    }
}

impl EnumeratorConfig {
    /// Full vendor names from the topology source's database
    pub fn topology_labels() -> Self {
        Self::default()
    }

    /// Short vendor labels from the built-in table
    pub fn static_labels() -> Self {
        Self {
            vendor_labels: VendorLabelStrategy::Static,
            ..Self::default()
        }
    }

    /// Check the configuration for values a scan cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(EnumerationError::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.unknown_vendor.trim().is_empty() || self.unknown_device.trim().is_empty() {
            return Err(EnumerationError::InvalidConfig(
                "sentinel labels must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a class code should be reported
    pub fn accepts_class(&self, code: u16) -> bool {
        crate::class::is_display_class(code) || self.extra_class_codes.contains(&code)
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(EnumerationError::Io)?;
        Self::from_json_str(&json)
    }
}
