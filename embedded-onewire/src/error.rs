#[allow(unused_imports)]
use crate::OneWireSearch;

/// One wire communication error type.
#[derive(Debug, PartialEq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    Other(E),
    /// Indicates that no device answered the reset pulse with a presence pulse.
    NoDevicePresent,
    /// Both bits of a search triplet read back as 1 at the given bit position,
    /// i.e. no device is left on the path being followed. [`OneWireSearch`] resets
    /// its state when this happens.
    ProtocolViolation {
        /// Bit position (0..64) where the bus went silent.
        bit: u8,
    },
    /// Indicates that the operation is not implemented, such as reading a triplet when not supported.
    Unimplemented,
    /// Computed CRC of the ROM is invalid. Carries the offending ROM code.
    InvalidRomCrc(u64),
    /// More devices answered than the caller provided room for.
    TooManyDevices,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}
