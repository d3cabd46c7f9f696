//! PCI display-class codes
//!
//! Class codes are 16 bits wide: `(base_class << 8) | subclass`. The
//! programming interface byte is not part of the comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display-class codes recognised by default (VGA, XGA, 3D, other display)
pub const DISPLAY_CLASS_CODES: [u16; 4] = [0x0300, 0x0301, 0x0302, 0x0380];

/// Known display controller subclasses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayClass {
    /// VGA compatible controller
    Vga,
    /// XGA compatible controller
    Xga,
    /// 3D controller (no VGA port)
    ThreeD,
    /// Display controller, other
    Other,
}

impl DisplayClass {
    /// Map a 16-bit class code to a display class
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0300 => Some(DisplayClass::Vga),
            0x0301 => Some(DisplayClass::Xga),
            0x0302 => Some(DisplayClass::ThreeD),
            0x0380 => Some(DisplayClass::Other),
            _ => None,
        }
    }

    /// The 16-bit class code for this display class
    pub fn code(&self) -> u16 {
        match self {
            DisplayClass::Vga => 0x0300,
            DisplayClass::Xga => 0x0301,
            DisplayClass::ThreeD => 0x0302,
            DisplayClass::Other => 0x0380,
        }
    }

    /// Name as listed in the PCI class-code registry
    pub fn description(&self) -> &'static str {
        match self {
            DisplayClass::Vga => "VGA compatible controller",
            DisplayClass::Xga => "XGA compatible controller",
            DisplayClass::ThreeD => "3D controller",
            DisplayClass::Other => "Display controller",
        }
    }
}

impl fmt::Display for DisplayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:04x}]", self.description(), self.code())
    }
}

/// Check whether a class code is one of the canonical display classes
pub fn is_display_class(code: u16) -> bool {
    DisplayClass::from_code(code).is_some()
}

/// Convert the 24-bit sysfs `class` attribute into a 16-bit class code
pub fn class_from_sysfs(raw: u32) -> u16 {
    ((raw >> 8) & 0xFFFF) as u16
}
