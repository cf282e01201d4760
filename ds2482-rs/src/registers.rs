use crate::{Ds2482Error, Ds2482Result};
use bitfield_struct::bitfield;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use embedded_onewire::OneWireStatus;

/// Command bytes understood by the DS2482.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Generate a 1-Wire triplet (two read slots and one write slot) for the search.
    OneWireTriplet = 0x78,
    /// Generate a single 1-Wire time slot.
    OneWireSingleBit = 0x87,
    /// Read a byte from the 1-Wire line into the read data register.
    OneWireReadByte = 0x96,
    /// Write a byte to the 1-Wire line.
    OneWireWriteByte = 0xa5,
    /// Generate a reset/presence-detect cycle.
    OneWireReset = 0xb4,
    /// Write the device configuration register.
    WriteConfiguration = 0xd2,
    /// Position the read pointer at a [`Register`].
    SetReadPointer = 0xe1,
    /// Global reset of the device state machine.
    DeviceReset = 0xf0,
}

/// Registers the read pointer can be set to.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// [`DeviceStatus`].
    Status = 0xf0,
    /// Result of the last 1-Wire read byte.
    ReadData = 0xe1,
    /// [`DeviceConfiguration`].
    Configuration = 0xc3,
}

/// A DS2482 I2C to 1-Wire bridge device.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal::i2c::I2c) trait).
/// Create one with [`Ds2482Builder`], which resets the chip first.
///
/// The bridge and its 1-Wire line are a single shared resource: operations must
/// be issued one at a time, which `&mut self` on every method enforces.
#[derive(Debug)]
pub struct Ds2482<I> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) retries: u8,
    pub(crate) config: DeviceConfiguration, // last configuration accepted by the chip
}

/// Builder for creating a [`Ds2482`] instance with custom configuration.
#[derive(Debug)]
pub struct Ds2482Builder {
    pub(crate) addr: u8,
    pub(crate) retries: u8,
    pub(crate) config: DeviceConfiguration,
}

impl Default for Ds2482Builder {
    fn default() -> Self {
        Ds2482Builder {
            addr: 0x18,
            retries: 100,
            config: DeviceConfiguration::new(),
        }
    }
}

impl Ds2482Builder {
    /// Sets the 7-bit I2C address of the device (`0x18` to `0x1b` depending on the AD pins).
    pub fn with_address(mut self, addr: u8) -> Self {
        self.addr = addr;
        self
    }

    /// Sets the retry count for the device.
    ///
    /// The retry count is the number of status reads the host performs
    /// while waiting for the 1-Wire line to become idle.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the device configuration written after the reset.
    pub fn with_config(mut self, config: DeviceConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Builds a new `Ds2482` instance: resets the chip and applies the configuration.
    ///
    /// On error the I2C bus is dropped.
    pub fn build<I: I2c<SevenBitAddress>>(self, i2c: I) -> Ds2482Result<Ds2482<I>, I::Error> {
        let mut dev = Ds2482 {
            i2c,
            addr: self.addr,
            retries: self.retries,
            config: DeviceConfiguration::new(),
        };
        let status = dev.device_reset()?;
        if !status.device_reset() {
            log::warn!("DS2482 at {:#04x} did not report a reset", dev.addr);
        }
        if self.config.configured() != dev.config.configured() {
            dev.write_config(self.config)?;
        }
        Ok(dev)
    }
}

impl<I> Ds2482<I> {
    /// Release the I2C bus.
    pub fn close(self) -> I {
        self.i2c
    }

    /// Configuration last accepted by the chip.
    pub fn config(&self) -> DeviceConfiguration {
        self.config
    }
}

impl<I: I2c<SevenBitAddress>> Ds2482<I> {
    pub(crate) fn write_command(&mut self, cmd: Command) -> Ds2482Result<(), I::Error> {
        self.i2c.write(self.addr, &[cmd as u8])?;
        Ok(())
    }

    pub(crate) fn write_command_data(
        &mut self,
        cmd: Command,
        data: u8,
    ) -> Ds2482Result<(), I::Error> {
        self.i2c.write(self.addr, &[cmd as u8, data])?;
        Ok(())
    }

    pub(crate) fn read_register_byte(&mut self) -> Ds2482Result<u8, I::Error> {
        let mut val = [0; 1];
        self.i2c.read(self.addr, &mut val)?;
        Ok(val[0])
    }

    /// Position the read pointer at `reg`.
    pub fn select_register(&mut self, reg: Register) -> Ds2482Result<(), I::Error> {
        self.write_command_data(Command::SetReadPointer, reg as u8)
    }

    /// Reset the device.
    ///
    /// Performs a global reset of device state machine logic. Terminates any ongoing 1-Wire
    /// communication. The cached configuration returns to its power-on default.
    ///
    /// # Returns
    /// The status register read right after the reset.
    pub fn device_reset(&mut self) -> Ds2482Result<DeviceStatus, I::Error> {
        self.write_command(Command::DeviceReset)?;
        self.config = DeviceConfiguration::new();
        let status = DeviceStatus::from_bits(self.read_register_byte()?);
        log::debug!("DS2482 reset: {status:?}");
        Ok(status)
    }

    /// Read the status register once.
    pub fn status(&mut self) -> Ds2482Result<DeviceStatus, I::Error> {
        self.select_register(Register::Status)?;
        Ok(DeviceStatus::from_bits(self.read_register_byte()?))
    }

    /// Poll the status register until the 1-Wire line is idle.
    ///
    /// At most `retries` reads are made. A short on the line is logged
    /// and otherwise ignored.
    pub fn wait_bus_idle(&mut self) -> Ds2482Result<DeviceStatus, I::Error> {
        self.select_register(Register::Status)?;
        for _ in 0..self.retries {
            let status = DeviceStatus::from_bits(self.read_register_byte()?);
            if status.short_detect() {
                log::warn!("1-Wire bus short detected");
            }
            if !status.onewire_busy() {
                return Ok(status);
            }
        }
        Err(Ds2482Error::RetriesExceeded)
    }

    /// Write the device configuration register.
    ///
    /// Only the lower nibble of `config` is used. The cache is updated only once the
    /// chip accepted the write.
    pub fn write_config(&mut self, config: DeviceConfiguration) -> Ds2482Result<(), I::Error> {
        let config = config.configured();
        self.write_command_data(Command::WriteConfiguration, config.encode())?;
        self.config = config;
        log::debug!("DS2482 configuration: {config:?}");
        Ok(())
    }

    /// Read the configuration register back from the chip.
    pub fn read_config(&mut self) -> Ds2482Result<DeviceConfiguration, I::Error> {
        self.select_register(Register::Configuration)?;
        Ok(DeviceConfiguration::from_bits(self.read_register_byte()?).configured())
    }

    /// Enable or disable the active pullup.
    pub fn set_active_pullup(&mut self, enable: bool) -> Ds2482Result<(), I::Error> {
        self.write_config(self.config.with_active_pullup(enable))
    }

    /// Switch the 1-Wire timing between standard and overdrive speed.
    pub fn set_high_speed(&mut self, enable: bool) -> Ds2482Result<(), I::Error> {
        self.write_config(self.config.with_onewire_speed(enable))
    }

    /// Arm or disarm the strong pullup for the next byte or bit.
    pub fn set_strong_pullup(&mut self, enable: bool) -> Ds2482Result<(), I::Error> {
        self.write_config(self.config.with_strong_pullup(enable))
    }
}

/// Status register for DS2482
/// The read-only Status register is the general means for
/// the DS2482 to report bit-type data from the 1-Wire side,
/// 1-Wire busy status, and its own reset status to the host
/// processor.
/// All 1-Wire communication commands and the Device Reset
/// command position the read pointer at the Status register.
/// Status information is updated during the execution of certain commands only.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct DeviceStatus {
    /// The 1WB bit reports whether the 1-Wire line is busy. During 1-Wire
    /// communication 1WB is 1; once the command is completed, 1WB returns to
    /// its default 0.
    pub onewire_busy: bool,
    /// The PPD bit is updated with every 1-Wire Reset command.
    /// It is set if a presence pulse was detected, and returns to 0 if there is no
    /// presence pulse during a subsequent 1-Wire Reset command.
    pub presence_pulse_detect: bool,
    /// The SD bit is updated with every 1-Wire Reset command.
    /// If a logic 0 is detected on the 1-Wire line at tSI during the presence-detect
    /// cycle, SD is set. A short at tMSP also sets PPD.
    pub short_detect: bool,
    /// The LL bit reports the logic state of the active 1-Wire line
    /// without initiating any 1-Wire communication. The line is sampled
    /// every time the Status register is read.
    pub logic_level: bool,
    /// If the RST bit is 1, the DS2482 has performed an internal
    /// reset cycle, either caused by a power-on reset or from
    /// executing the Device Reset command. It is cleared by a Write
    /// Device Configuration command.
    pub device_reset: bool,
    /// The SBR bit reports the logic state of the active 1-Wire
    /// line sampled at tMSR of a 1-Wire Single Bit command or
    /// the first bit of a 1-Wire Triplet command.
    pub single_bit_result: bool,
    /// The TSB bit reports the logic state of the active 1-Wire
    /// line sampled at tMSR of the second bit of a 1-Wire Triplet
    /// command. Only updated by the triplet.
    pub triplet_second_bit: bool,
    /// The search direction chosen by the third bit of the last
    /// 1-Wire Triplet command. Only updated by the triplet.
    pub branch_dir_taken: bool,
}

impl OneWireStatus for DeviceStatus {
    fn presence(&self) -> bool {
        self.presence_pulse_detect()
    }

    fn shortcircuit(&self) -> bool {
        self.short_detect()
    }

    fn logic_level(&self) -> Option<bool> {
        Some(self.logic_level())
    }

    fn direction(&self) -> Option<bool> {
        Some(self.branch_dir_taken())
    }
}

#[bitfield(u8)]
#[derive(PartialEq, Eq)]
/// # Device configuration register
///
/// The DS2482 supports three 1-Wire features that are
/// enabled or selected through the Device Configuration
/// register:
/// - Active Pullup (APU)
/// - Strong Pullup (SPU)
/// - 1-Wire Speed (1WS)
///
/// APU, SPU, and 1WS can be selected in any combination.
/// While APU and 1WS maintain their states, SPU returns to
/// its inactive state as soon as the strong pullup has ended.
///
/// The chip only accepts a write whose upper nibble is the one's
/// complement of the lower nibble, see [`DeviceConfiguration::encode`].
/// After a device reset the register reads 00h.
pub struct DeviceConfiguration {
    /// The APU bit controls whether an active pullup (low impedance
    /// transistor) or a passive pullup (resistor) is
    /// used to drive a 1-Wire line from low to high.
    pub active_pullup: bool,
    /// Reserved.
    pub reserved: bool,
    /// The SPU bit is used to activate the strong pullup function prior to a
    /// 1-Wire Write Byte or 1-Wire Single Bit command, e.g. for EEPROM copy
    /// operations or parasitically powered temperature conversions.
    pub strong_pullup: bool,
    /// The 1WS bit selects overdrive (1) or standard (0) 1-Wire timing.
    pub onewire_speed: bool,
    #[bits(4)]
    __: u8,
}

impl DeviceConfiguration {
    /// The four significant bits only.
    pub fn configured(&self) -> Self {
        Self::from_bits(self.into_bits() & 0x0f)
    }

    /// Byte written to the chip: the logical nibble with its complement in the upper nibble.
    pub fn encode(&self) -> u8 {
        let cfg = self.into_bits() & 0x0f;
        cfg | (!cfg << 4)
    }
}
