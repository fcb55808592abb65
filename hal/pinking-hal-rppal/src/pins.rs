//! Header pin mapping
//!
//! Maps physical header positions to BCM GPIO line numbers for the
//! 40-pin header shared by every Raspberry Pi since the B+.

use pinking_hal::Channel;

/// Number of pins on the header
pub const HEADER_PINS: usize = 40;

/// BCM line for each physical pin (index = channel - 1)
///
/// `None` marks power, ground and the HAT ID EEPROM pins, which are never
/// handed out as GPIOs.
#[rustfmt::skip]
pub const BOARD_TO_BCM: [Option<u8>; HEADER_PINS] = [
    // 1        2
    None,     None,     // 3V3, 5V
    Some(2),  None,     // GPIO02, 5V
    Some(3),  None,     // GPIO03, GND
    Some(4),  Some(14), // GPIO04, GPIO14
    None,     Some(15), // GND, GPIO15
    // 11       12
    Some(17), Some(18),
    Some(27), None,
    Some(22), Some(23),
    None,     Some(24),
    Some(10), None,
    // 21       22
    Some(9),  Some(25),
    Some(11), Some(8),
    None,     Some(7),
    None,     None,     // ID_SD, ID_SC
    Some(5),  None,
    // 31       32
    Some(6),  Some(12),
    Some(13), None,
    Some(19), Some(16),
    Some(26), Some(20),
    None,     Some(21),
];

/// Look up the BCM line behind a physical channel
pub fn board_to_bcm(channel: Channel) -> Option<u8> {
    usize::from(channel)
        .checked_sub(1)
        .and_then(|index| BOARD_TO_BCM.get(index).copied().flatten())
}
