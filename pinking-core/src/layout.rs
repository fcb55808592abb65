//! Pin layout table
//!
//! Maps board revision codes to the ordered pin names of their header.
//! Index `i` in a layout is physical channel `i + 1`; pins come in pairs
//! (odd channels on the left column, even on the right).

use heapless::Vec;
use pinking_hal::Channel;

/// Largest header supported
pub const MAX_PINS: usize = 40;

/// Pin names that are power, ground or HAT ID lines
pub const RESERVED_PINS: [&str; 5] = ["GND", "5V", "3V3", "ID_SC", "ID_SD"];

/// Check if a pin name is reserved
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_PINS.contains(&name)
}

/// Problems found when validating a layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// No pins at all
    #[error("layout is empty")]
    Empty,
    /// Odd number of pins (header has two columns)
    #[error("layout has {0} pins, expected an even number")]
    OddLength(usize),
    /// More pins than the controller can track
    #[error("layout has {0} pins, at most {MAX_PINS} are supported")]
    TooLarge(usize),
    /// A non-reserved name appears twice
    #[error("pin name {0} appears more than once")]
    DuplicateName(&'static str),
}

/// Ordered pin names of one header
#[derive(Debug, PartialEq, Eq)]
pub struct PinLayout {
    names: &'static [&'static str],
}

impl PinLayout {
    /// Create a layout from pin names in channel order
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Check the two-column and uniqueness invariants
    ///
    /// Reserved names (ground, rails) repeat on real headers and are
    /// exempt from the uniqueness rule.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let len = self.names.len();
        if len == 0 {
            return Err(LayoutError::Empty);
        }
        if len % 2 != 0 {
            return Err(LayoutError::OddLength(len));
        }
        if len > MAX_PINS {
            return Err(LayoutError::TooLarge(len));
        }

        let mut seen: Vec<&'static str, MAX_PINS> = Vec::new();
        for name in self.names.iter().copied().filter(|n| !is_reserved_name(n)) {
            if seen.contains(&name) {
                return Err(LayoutError::DuplicateName(name));
            }
            let _ = seen.push(name);
        }
        Ok(())
    }

    /// Number of pins
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the layout has no pins
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of header rows
    pub fn rows(&self) -> usize {
        self.names.len() / 2
    }

    /// All pin names in channel order
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Name of a pin
    pub fn name(&self, pin: usize) -> Option<&'static str> {
        self.names.get(pin).copied()
    }

    /// Check if a pin is reserved (never changes direction)
    pub fn is_reserved(&self, pin: usize) -> bool {
        self.name(pin).is_some_and(is_reserved_name)
    }

    /// Physical channel of a pin
    pub fn channel(&self, pin: usize) -> Channel {
        (pin + 1) as Channel
    }

    /// Pin for a physical channel
    pub fn pin_for_channel(&self, channel: Channel) -> Option<usize> {
        let pin = usize::from(channel).checked_sub(1)?;
        (pin < self.names.len()).then_some(pin)
    }

    /// Width of the longest pin name, for column alignment
    pub fn label_width(&self) -> usize {
        self.names.iter().map(|n| n.len()).max().unwrap_or(0)
    }
}

/// Raspberry Pi 40-pin header (Pi 2 Model B and later)
#[rustfmt::skip]
static PI_40PIN: [&str; 40] = [
    // 1           2
    "3V3",      "5V",
    "GPIO02",   "5V",
    "GPIO03",   "GND",
    "GPIO04",   "GPIO14",
    "GND",      "GPIO15",
    // 11          12
    "GPIO17",   "GPIO18",
    "GPIO27",   "GND",
    "GPIO22",   "GPIO23",
    "3V3",      "GPIO24",
    "GPIO10",   "GND",
    // 21          22
    "GPIO09",   "GPIO25",
    "GPIO11",   "GPIO08",
    "GND",      "GPIO07",
    "ID_SD",    "ID_SC",
    "GPIO05",   "GND",
    // 31          32
    "GPIO06",   "GPIO12",
    "GPIO13",   "GND",
    "GPIO19",   "GPIO16",
    "GPIO26",   "GPIO20",
    "GND",      "GPIO21",
];

/// Shared 40-pin layout
pub static PI_40PIN_LAYOUT: PinLayout = PinLayout::new(&PI_40PIN);

/// Known revisions and their layouts
///
/// Revision codes are lowercase hex as printed by `/proc/cpuinfo`.
pub static LAYOUTS: [(&str, &PinLayout); 8] = [
    // Raspberry Pi 2 Model B (Sony UK / Embest China)
    ("a01041", &PI_40PIN_LAYOUT),
    ("a21041", &PI_40PIN_LAYOUT),
    // Raspberry Pi 3 Model B
    ("a02082", &PI_40PIN_LAYOUT),
    ("a22082", &PI_40PIN_LAYOUT),
    // Raspberry Pi 3 Model B+
    ("a020d3", &PI_40PIN_LAYOUT),
    // Raspberry Pi 4 Model B (1/2/4 GB)
    ("a03111", &PI_40PIN_LAYOUT),
    ("b03111", &PI_40PIN_LAYOUT),
    ("c03111", &PI_40PIN_LAYOUT),
];

/// Find the layout for a revision code
///
/// Surrounding whitespace and letter case are ignored.
pub fn lookup(revision: &str) -> Option<&'static PinLayout> {
    let revision = revision.trim();
    LAYOUTS
        .iter()
        .find(|(rev, _)| rev.eq_ignore_ascii_case(revision))
        .map(|(_, layout)| *layout)
}

/// Iterate over all known revision codes
pub fn known_revisions() -> impl Iterator<Item = &'static str> {
    LAYOUTS.iter().map(|(rev, _)| *rev)
}
