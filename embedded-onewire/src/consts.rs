//! ROM command constants for 1-Wire communication.

/// Command to read the ROM of the only device on a single-drop bus.
pub(crate) const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode)
pub(crate) const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication (non-overdrive mode)
pub(crate) const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// Reselects the device addressed by the most recent Match ROM without
/// retransmitting its 64-bit ROM code.
pub(crate) const ONEWIRE_RESUME_CMD: u8 = 0xa5;

/// The Overdrive-Match ROM command followed by a 64-bit
/// ROM sequence transmitted at overdrive speed allows the
/// bus master to address a specific device on a multidrop
/// bus and to simultaneously set it in overdrive mode.
/// Slaves already in overdrive mode from a previous
/// Overdrive-Skip ROM or successful Overdrive-Match
/// ROM command remain in overdrive mode. All overdrive-capable
/// slaves return to standard speed at the next reset
/// pulse of minimum 480μs duration.
pub(crate) const ONEWIRE_MATCH_ROM_CMD_OD: u8 = 0x69;

/// Like Skip ROM, but sets every overdrive-capable device on the bus
/// into overdrive mode.
pub(crate) const ONEWIRE_SKIP_ROM_CMD_OD: u8 = 0x3c;

/// Command to search for devices on the 1-Wire bus
pub(crate) const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Command to search for devices in alarm state on the 1-Wire bus
pub(crate) const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xec;
