use crate::{
    Ds2482, Ds2482Error, Ds2482Result,
    registers::{Command, DeviceStatus, Register},
};
use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_onewire::{OneWire, OneWireResult};

impl<I2C: I2c<SevenBitAddress>> Ds2482<I2C> {
    // Single time slot; the returned status carries the sampled bit.
    fn single_bit(&mut self, bit: bool) -> Ds2482Result<DeviceStatus, I2C::Error> {
        self.wait_bus_idle()?;
        self.write_command_data(Command::OneWireSingleBit, if bit { 0x80 } else { 0x0 })?;
        self.wait_bus_idle()
    }
}

impl<I2C: I2c<SevenBitAddress>> OneWire for Ds2482<I2C> {
    type Status = DeviceStatus;

    type BusError = Ds2482Error<I2C::Error>;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        self.wait_bus_idle()?;
        self.write_command(Command::OneWireReset)?;
        Ok(self.wait_bus_idle()?)
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.wait_bus_idle()?;
        self.write_command_data(Command::OneWireWriteByte, byte)?;
        self.wait_bus_idle()?;
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        self.wait_bus_idle()?;
        self.write_command(Command::OneWireReadByte)?;
        self.wait_bus_idle()?;
        self.select_register(Register::ReadData)?;
        Ok(self.read_register_byte()?)
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        self.single_bit(bit)?;
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        // Writing a 1 releases the line so the slave can pull it low.
        Ok(self.single_bit(true)?.single_bit_result())
    }

    fn read_triplet(
        &mut self,
        direction: bool,
    ) -> OneWireResult<(bool, bool, bool), Self::BusError> {
        self.wait_bus_idle()?;
        self.write_command_data(Command::OneWireTriplet, if direction { 0xff } else { 0x0 })?;
        let status = self.wait_bus_idle()?;
        Ok((
            status.single_bit_result(),
            status.triplet_second_bit(),
            status.branch_dir_taken(),
        ))
    }

    fn get_overdrive_mode(&mut self) -> bool {
        self.config.onewire_speed()
    }

    fn set_overdrive_mode(&mut self, enable: bool) -> OneWireResult<(), Self::BusError> {
        self.set_high_speed(enable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceConfiguration, Ds2482, Ds2482Error};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_onewire::{OneWire, OneWireError, OneWireStatus};

    const ADDR: u8 = 0x18;

    fn device(expectations: &[I2cTransaction]) -> Ds2482<I2cMock> {
        Ds2482 {
            i2c: I2cMock::new(expectations),
            addr: ADDR,
            retries: 100,
            config: DeviceConfiguration::new(),
        }
    }

    fn idle(status: u8) -> [I2cTransaction; 2] {
        [
            I2cTransaction::write(ADDR, vec![0xe1, 0xf0]),
            I2cTransaction::read(ADDR, vec![status]),
        ]
    }

    fn bus_reset(status: u8) -> Vec<I2cTransaction> {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0xb4]));
        t.extend(idle(status));
        t
    }

    fn byte_write(byte: u8) -> Vec<I2cTransaction> {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0xa5, byte]));
        t.extend(idle(0x00));
        t
    }

    #[test]
    fn reset_reports_presence() {
        let mut dev = device(&bus_reset(0x02));
        assert!(dev.reset().unwrap().presence());
        dev.close().done();

        let mut dev = device(&bus_reset(0x00));
        assert!(!dev.reset().unwrap().presence());
        dev.close().done();
    }

    #[test]
    fn reset_times_out() {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0xb4]));
        t.push(I2cTransaction::write(ADDR, vec![0xe1, 0xf0]));
        t.extend((0..2).map(|_| I2cTransaction::read(ADDR, vec![0x01])));
        let mut dev = device(&t);
        dev.retries = 2;
        assert_eq!(
            dev.reset().err(),
            Some(OneWireError::Other(Ds2482Error::RetriesExceeded))
        );
        dev.close().done();
    }

    #[test]
    fn write_byte_waits_before_and_after() {
        let mut dev = device(&byte_write(0x44));
        dev.write_byte(0x44).unwrap();
        dev.close().done();
    }

    #[test]
    fn write_byte_transport_error() {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0xa5, 0x44]).with_error(ErrorKind::Other));
        let mut dev = device(&t);
        assert_eq!(
            dev.write_byte(0x44),
            Err(OneWireError::Other(Ds2482Error::I2c(ErrorKind::Other)))
        );
        dev.close().done();
    }

    #[test]
    fn read_byte_selects_data_register() {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0x96]));
        t.extend(idle(0x00));
        t.push(I2cTransaction::write(ADDR, vec![0xe1, 0xe1]));
        t.push(I2cTransaction::read(ADDR, vec![0x5a]));
        let mut dev = device(&t);
        assert_eq!(dev.read_byte(), Ok(0x5a));
        dev.close().done();
    }

    #[test]
    fn bits() {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0x87, 0x00]));
        t.extend(idle(0x00));
        t.extend(idle(0x00));
        t.push(I2cTransaction::write(ADDR, vec![0x87, 0x80]));
        t.extend(idle(0x20));
        t.extend(idle(0x00));
        t.push(I2cTransaction::write(ADDR, vec![0x87, 0x80]));
        t.extend(idle(0x00));
        let mut dev = device(&t);
        dev.write_bit(false).unwrap();
        assert_eq!(dev.read_bit(), Ok(true));
        assert_eq!(dev.read_bit(), Ok(false));
        dev.close().done();
    }

    #[test]
    fn triplet_reports_bits_and_direction() {
        let mut t = idle(0x00).to_vec();
        t.push(I2cTransaction::write(ADDR, vec![0x78, 0x00]));
        t.extend(idle(0x00));
        t.extend(idle(0x00));
        t.push(I2cTransaction::write(ADDR, vec![0x78, 0xff]));
        t.extend(idle(0xa0));
        // Short detected while probing: only logged.
        t.extend(idle(0x00));
        t.push(I2cTransaction::write(ADDR, vec![0x78, 0x00]));
        t.extend(idle(0x64));
        let mut dev = device(&t);
        assert_eq!(dev.read_triplet(false), Ok((false, false, false)));
        assert_eq!(dev.read_triplet(true), Ok((true, false, true)));
        assert_eq!(dev.read_triplet(false), Ok((true, true, false)));
        dev.close().done();
    }

    #[test]
    fn block_transfers() {
        let mut t = byte_write(0xbe);
        t.extend(byte_write(0xef));
        for byte in [0x12, 0x34] {
            t.extend(idle(0x00));
            t.push(I2cTransaction::write(ADDR, vec![0x96]));
            t.extend(idle(0x00));
            t.push(I2cTransaction::write(ADDR, vec![0xe1, 0xe1]));
            t.push(I2cTransaction::read(ADDR, vec![byte]));
        }
        let mut dev = device(&t);
        dev.write_bytes(&[0xbe, 0xef]).unwrap();
        let mut buf = [0; 2];
        dev.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
        dev.close().done();
    }

    #[test]
    fn match_rom_sends_family_first() {
        let rom = 0xa200_0000_01b8_1c02u64;
        let mut t = bus_reset(0x02);
        t.extend(byte_write(0x55));
        for byte in [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2] {
            t.extend(byte_write(byte));
        }
        let mut dev = device(&t);
        dev.match_rom(rom).unwrap();
        dev.close().done();
    }

    #[test]
    fn resume_and_skip() {
        let mut t = bus_reset(0x02);
        t.extend(byte_write(0xa5));
        t.extend(bus_reset(0x02));
        t.extend(byte_write(0xcc));
        let mut dev = device(&t);
        dev.resume().unwrap();
        dev.address(None).unwrap();
        dev.close().done();
    }

    #[test]
    fn overdrive_match_switches_speed_before_rom() {
        let rom = 0xa200_0000_01b8_1c02u64;
        let mut t = bus_reset(0x02);
        t.extend(byte_write(0x69));
        t.push(I2cTransaction::write(ADDR, vec![0xd2, 0x78]));
        for byte in rom.to_le_bytes() {
            t.extend(byte_write(byte));
        }
        let mut dev = device(&t);
        assert!(!dev.get_overdrive_mode());
        dev.overdrive_match_rom(rom).unwrap();
        assert!(dev.get_overdrive_mode());
        dev.close().done();
    }

    #[test]
    fn read_rom_checks_crc() {
        let mut t = bus_reset(0x02);
        t.extend(byte_write(0x33));
        for byte in [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa3] {
            t.extend(idle(0x00));
            t.push(I2cTransaction::write(ADDR, vec![0x96]));
            t.extend(idle(0x00));
            t.push(I2cTransaction::write(ADDR, vec![0xe1, 0xe1]));
            t.push(I2cTransaction::read(ADDR, vec![byte]));
        }
        let mut dev = device(&t);
        assert_eq!(
            dev.read_rom(),
            Err(OneWireError::InvalidRomCrc(0xa300_0000_01b8_1c02))
        );
        dev.close().done();
    }

    #[test]
    fn read_rom_on_empty_bus() {
        let mut dev = device(&bus_reset(0x00));
        assert_eq!(dev.read_rom(), Err(OneWireError::NoDevicePresent));
        dev.close().done();
    }
}
