use crate::{
    OneWire, OneWireStatus,
    consts::{ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD},
    crc::OneWireCrc,
    error::OneWireError,
};

/// Search progress carried from one pass to the next.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    /// ROM code assembled by the last pass, bit 0 first.
    pub last_device: u64,
    /// Lowest bit position where the next pass must take the 1 branch instead of
    /// the 0 branch. [`None`] starts a fresh search.
    pub resume_bit: Option<u8>,
}

impl SearchState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of a single search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// No presence pulse after the bus reset.
    NoDevices,
    /// A device with a valid ROM code was found.
    Device {
        /// ROM code of the device.
        rom: u64,
        /// No discrepancy was left on the path: this is the last device.
        last: bool,
    },
}

/// A structure for searching devices on a 1-Wire bus.
/// This structure implements the search algorithm for discovering devices on the 1-Wire bus.
/// It maintains the state of the search.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cmd: u8,
    state: SearchState,
    finished: bool,
}

#[repr(u8)]
/// Type of search performed using [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `cmd` - The kind of search to run (normal, or alarmed devices only).
    pub fn new(onewire: &'a mut T, cmd: OneWireSearchKind) -> Self {
        Self {
            onewire,
            cmd: cmd as _,
            state: SearchState::default(),
            finished: false,
        }
    }

    /// Current search state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Resets the search state; the next pass starts over.
    pub fn reset(&mut self) {
        self.state.reset();
        self.finished = false;
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Runs one pass of the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
    ///
    /// Each pass walks the 64 ROM bits, replaying the previous path up to the
    /// resume bit, taking the 1 branch there and the 0 branch past it. The last
    /// position where both branches existed and the 0 branch was taken becomes the
    /// resume bit of the next pass.
    ///
    /// On any error the search state is reset.
    ///
    /// # Errors
    /// * [`OneWireError::ProtocolViolation`] if no device answered at some bit position.
    /// * [`OneWireError::InvalidRomCrc`] if the assembled ROM code fails its CRC.
    pub fn step(&mut self) -> Result<SearchStep, OneWireError<T::BusError>> {
        let res = self.pass();
        if res.is_err() {
            self.state.reset();
        }
        res
    }

    fn pass(&mut self) -> Result<SearchStep, OneWireError<T::BusError>> {
        let status = self.onewire.reset()?;
        if !status.presence() {
            log::debug!("search: no presence pulse");
            return Ok(SearchStep::NoDevices);
        }
        self.onewire.write_byte(self.cmd)?;
        let mut last_zero = None;
        for bit in 0..64u8 {
            let mask = 1u64 << bit;
            let dir = match self.state.resume_bit {
                Some(resume) if bit < resume => self.state.last_device & mask != 0,
                Some(resume) => bit == resume,
                None => false,
            };
            let (id_bit, complement_bit, taken) = self.triplet(dir)?;
            if id_bit && complement_bit {
                log::debug!("search: no device answered at bit {bit}");
                return Err(OneWireError::ProtocolViolation { bit });
            }
            if !id_bit && !complement_bit && !dir {
                last_zero = Some(bit);
            }
            if taken {
                self.state.last_device |= mask;
            } else {
                self.state.last_device &= !mask;
            }
        }
        let rom = self.state.last_device;
        if !OneWireCrc::validate_rom(rom) {
            log::warn!("search: invalid CRC on ROM {rom:016x}");
            return Err(OneWireError::InvalidRomCrc(rom));
        }
        self.state.resume_bit = last_zero;
        log::debug!("search: found {rom:016x}, resume at {last_zero:?}");
        Ok(SearchStep::Device {
            rom,
            last: last_zero.is_none(),
        })
    }

    // Use the master's triplet command if it has one, otherwise read both bits
    // and write the direction ourselves.
    fn triplet(
        &mut self,
        direction: bool,
    ) -> Result<(bool, bool, bool), OneWireError<T::BusError>> {
        match self.onewire.read_triplet(direction) {
            Err(OneWireError::Unimplemented) => {
                let id_bit = self.onewire.read_bit()?;
                let complement_bit = self.onewire.read_bit()?;
                if id_bit && complement_bit {
                    return Ok((true, true, true));
                }
                let taken = if id_bit != complement_bit {
                    id_bit
                } else {
                    direction
                };
                self.onewire.write_bit(taken)?;
                Ok((id_bit, complement_bit, taken))
            }
            res => res,
        }
    }

    /// Searches for devices on the 1-Wire bus.
    /// The [next](OneWireSearch::next) method can be called repeatedly to find all devices on the bus.
    /// At the end of the search, calling this method will return `None` to indicate that no more devices are present.
    /// A pass in which no device answers ends the search as well.
    ///
    /// # Returns
    /// A result containing the ROM code of the found device as a `u64` value.
    ///
    /// | Bit | Description |
    /// |-----|-------------|
    /// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
    /// | 8-55 | Serial number |
    /// | 56-63 | CRC-8 (`0b1_0011_0001` poly) |
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<u64>, OneWireError<T::BusError>> {
        if self.finished {
            return Ok(None);
        }
        match self.step() {
            Ok(SearchStep::Device { rom, last }) => {
                self.finished = last;
                Ok(Some(rom))
            }
            Ok(SearchStep::NoDevices) | Err(OneWireError::ProtocolViolation { .. }) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Verifies if the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// This function resets the search state, and calling [next](OneWireSearch::next) after this call will start a new search.
    pub fn verify(&mut self, rom: u64) -> Result<bool, OneWireError<T::BusError>> {
        self.reset();
        self.state.last_device = rom;
        self.state.resume_bit = Some(64); // replay every bit
        let res = match self.step() {
            Ok(SearchStep::Device { rom: found, .. }) => Ok(found == rom),
            Ok(SearchStep::NoDevices) | Err(OneWireError::ProtocolViolation { .. }) => Ok(false),
            Err(e) => Err(e),
        };
        self.reset();
        res
    }
}
