//! Vendor label resolution
//!
//! A vendor label is either the full name from the topology source's name
//! database or a short label from the built-in table below. Device names
//! always come from the topology source.

use crate::topology::TopologySession;
use serde::{Deserialize, Serialize};

/// Short label for a well-known PCI vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownVendor {
    /// PCI vendor identifier
    pub id: u16,
    /// Short label (e.g. "NVIDIA")
    pub label: &'static str,
}

/// Built-in vendor labels for display hardware
pub const KNOWN_VENDORS: &[KnownVendor] = &[
    // Discrete and integrated GPUs
    KnownVendor { id: 0x1002, label: "ATI" },
    KnownVendor { id: 0x10de, label: "NVIDIA" },
    KnownVendor { id: 0x8086, label: "Intel" },
    KnownVendor { id: 0x1022, label: "AMD" },
    KnownVendor { id: 0x102b, label: "Matrox" },
    KnownVendor { id: 0x1a03, label: "ASPEED" },
    KnownVendor { id: 0x1d17, label: "Zhaoxin" },
    KnownVendor { id: 0x1ed5, label: "Moore Threads" },
    KnownVendor { id: 0x5143, label: "Qualcomm" },
    KnownVendor { id: 0x13b5, label: "ARM" },
    KnownVendor { id: 0x5333, label: "S3" },
    KnownVendor { id: 0x18ca, label: "XGI" },
    KnownVendor { id: 0x1039, label: "SiS" },
    KnownVendor { id: 0x121a, label: "3dfx" },

    // Virtual display adapters
    KnownVendor { id: 0x15ad, label: "VMware" },
    KnownVendor { id: 0x80ee, label: "VirtualBox" },
    KnownVendor { id: 0x1234, label: "QEMU" },
    KnownVendor { id: 0x1af4, label: "Red Hat" },
    KnownVendor { id: 0x1b36, label: "Red Hat" },
    KnownVendor { id: 0x1414, label: "Microsoft" },
];

/// Look up a vendor in the built-in table
pub fn identify_vendor(vendor_id: u16) -> Option<&'static KnownVendor> {
    KNOWN_VENDORS.iter().find(|v| v.id == vendor_id)
}

/// Where vendor labels come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorLabelStrategy {
    /// Full vendor name from the topology source
    #[default]
    Topology,
    /// Short label from [`KNOWN_VENDORS`]
    Static,
}

impl VendorLabelStrategy {
    /// Resolver implementing this strategy
    pub fn labeler(&self) -> Box<dyn VendorLabeler> {
        match self {
            VendorLabelStrategy::Topology => Box::new(TopologyVendorLabels),
            VendorLabelStrategy::Static => Box::new(StaticVendorLabels),
        }
    }
}

/// Resolves a vendor identifier to a display label
pub trait VendorLabeler: Send + Sync {
    /// Label for `vendor_id`, or `None` if it cannot be resolved
    fn label(&self, session: &dyn TopologySession, vendor_id: u16) -> Option<String>;
}

/// Labels from the topology source's name database
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyVendorLabels;

impl VendorLabeler for TopologyVendorLabels {
    fn label(&self, session: &dyn TopologySession, vendor_id: u16) -> Option<String> {
        session.vendor_name(vendor_id)
    }
}

/// Labels from the built-in table
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticVendorLabels;

impl VendorLabeler for StaticVendorLabels {
    fn label(&self, _session: &dyn TopologySession, vendor_id: u16) -> Option<String> {
        identify_vendor(vendor_id).map(|v| v.label.to_string())
    }
}
