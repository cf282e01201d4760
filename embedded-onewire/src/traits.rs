use crate::{
    OneWireCrc, OneWireError, OneWireResult, OneWireSearch, OneWireSearchKind,
    consts::{
        ONEWIRE_MATCH_ROM_CMD, ONEWIRE_MATCH_ROM_CMD_OD, ONEWIRE_READ_ROM_CMD, ONEWIRE_RESUME_CMD,
        ONEWIRE_SKIP_ROM_CMD, ONEWIRE_SKIP_ROM_CMD_OD,
    },
};

/// Snapshot of the bus state reported by a 1-Wire master.
pub trait OneWireStatus {
    /// A presence pulse was detected during the last reset.
    fn presence(&self) -> bool;
    /// A short circuit was detected on the bus.
    fn shortcircuit(&self) -> bool;
    /// Logic level of the bus line, if the master reports it.
    fn logic_level(&self) -> Option<bool> {
        None
    }
    /// Branch direction taken by the last triplet, if the master reports it.
    fn direction(&self) -> Option<bool> {
        None
    }
}

/// Trait for 1-Wire communication.
///
/// Every method returns only once the bus is idle again, so callers never
/// need to wait between operations.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// An empty bus is not an error: check [`OneWireStatus::presence`] on the result.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a byte to the 1-Wire bus.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Reads a byte from the 1-Wire bus.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes `bytes` one at a time. There is no atomicity beyond each byte.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Fills `buf` one byte at a time.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for byte in buf.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    /// # Note: Not intended for public API use.
    /// ## This method is internally used by the [search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
    ///
    /// Generates three time slots: two read time slots and one write time slot at the 1-Wire line. The
    /// type of write time slot depends on the result of the read time slots and the direction bit.
    /// The direction determines the type of write time slot if both read time slots are 0 (a typical
    /// case).
    /// If the read time slots are 0 and 1, they are followed by a write-zero time slot.
    /// If the read time slots are 1 and 0, they are followed by a write-one time slot.
    /// If the read time slots are both 1 (error case), the subsequent write time slot is a write-one.
    ///
    /// # Returns
    /// A tuple of the id bit, the complement bit and the direction actually written.
    ///
    /// # Errors
    /// Masters without a triplet command return [`OneWireError::Unimplemented`], and the
    /// search falls back to bit reads and writes.
    fn read_triplet(
        &mut self,
        _direction: bool,
    ) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Check if the 1-Wire master is timing the bus at overdrive speed.
    fn get_overdrive_mode(&mut self) -> bool;

    /// Switch the 1-Wire master's own timing between standard and overdrive speed.
    ///
    /// This does not address any slave; see [`OneWire::overdrive_match_rom`].
    fn set_overdrive_mode(&mut self, _enable: bool) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Reset the bus and select exactly the device with ROM code `rom`.
    ///
    /// The ROM is sent least significant byte (family code) first.
    fn match_rom(&mut self, rom: u64) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
        self.write_bytes(&rom.to_le_bytes())
    }

    /// Reset the bus and select every device on it.
    fn skip_rom(&mut self) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_SKIP_ROM_CMD)
    }

    /// Reset the bus and reselect the device chosen by the most recent match,
    /// without resending its ROM code.
    fn resume(&mut self) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_RESUME_CMD)
    }

    /// Reset the bus, select the device with ROM code `rom` and put it in overdrive mode.
    ///
    /// The master is switched to overdrive right after the command byte, so the
    /// ROM code itself goes out at overdrive speed.
    fn overdrive_match_rom(&mut self, rom: u64) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_MATCH_ROM_CMD_OD)?;
        self.set_overdrive_mode(true)?;
        self.write_bytes(&rom.to_le_bytes())
    }

    /// Reset the bus, select every device on it and put them in overdrive mode.
    fn overdrive_skip_rom(&mut self) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_SKIP_ROM_CMD_OD)?;
        self.set_overdrive_mode(true)
    }

    /// Addresses devices on the 1-Wire bus.
    ///
    /// Pass [`None`] to skip ROM addressing and address all devices on the bus.
    /// Note: a read will return garbage data if all devices are addressed on a bus
    /// with more than one device.
    fn address(&mut self, rom: Option<u64>) -> OneWireResult<(), Self::BusError> {
        match rom {
            Some(rom) => self.match_rom(rom),
            None => self.skip_rom(),
        }
    }

    /// Read the ROM code of the only device on a single-drop bus.
    ///
    /// # Errors
    /// [`OneWireError::NoDevicePresent`] on an empty bus, [`OneWireError::InvalidRomCrc`]
    /// if the code read back does not check out (e.g. more than one device answered).
    fn read_rom(&mut self) -> OneWireResult<u64, Self::BusError> {
        if !self.reset()?.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0u8; 8];
        self.read_bytes(&mut rom)?;
        let rom = u64::from_le_bytes(rom);
        if OneWireCrc::validate_rom(rom) {
            Ok(rom)
        } else {
            Err(OneWireError::InvalidRomCrc(rom))
        }
    }

    /// Enumerate every device on the bus.
    ///
    /// Each call is a fresh, complete scan. Devices are returned in ascending order
    /// of their ROM codes read least significant bit first.
    ///
    /// # Errors
    /// [`OneWireError::TooManyDevices`] if more than `N` devices answer,
    /// [`OneWireError::InvalidRomCrc`] if a scanned ROM code fails its CRC. Bus and
    /// master errors are passed through.
    fn find_devices<const N: usize>(
        &mut self,
    ) -> OneWireResult<heapless::Vec<u64, N>, Self::BusError>
    where
        Self: Sized,
    {
        let mut devices = heapless::Vec::new();
        let mut search = OneWireSearch::new(self, OneWireSearchKind::Normal);
        while let Some(rom) = search.next()? {
            devices
                .push(rom)
                .map_err(|_| OneWireError::TooManyDevices)?;
        }
        Ok(devices)
    }
}
