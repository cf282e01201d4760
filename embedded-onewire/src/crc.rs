//! CRC checks used on the 1-Wire bus.
//!
//! ROM codes carry an 8-bit Dallas/Maxim CRC (`x^8 + x^5 + x^4 + 1`, reflected) in their
//! most significant byte, and many devices protect memory/scratchpad payloads with an
//! inverted 16-bit CRC (`x^16 + x^15 + x^2 + 1`, reflected).

#[derive(Debug, Default, Clone, Copy)]
/// Calculate CRC-8 used in 1-Wire communications.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        #[cfg(feature = "crc-table")]
        {
            self.0 = CRC8_TABLE[(self.0 ^ byte) as usize];
        }
        #[cfg(not(feature = "crc-table"))]
        {
            self.0 = crc8_bitwise(self.0, byte);
        }
    }

    /// CRC-8 of a sequence of bytes.
    pub fn compute(sequence: &[u8]) -> u8 {
        let mut crc = OneWireCrc::default();
        for &byte in sequence.iter() {
            crc.update(byte);
        }
        crc.0
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // A trailing CRC drives the running value back to zero.
        Self::compute(sequence) == 0x0
    }

    /// Validate a ROM code as returned by [`OneWireSearch`](crate::OneWireSearch)
    /// (family code in the least significant byte, CRC in the most significant byte).
    pub fn validate_rom(rom: u64) -> bool {
        Self::validate(&rom.to_le_bytes())
    }
}

const CRC8_POLY: u8 = 0x8c;

#[cfg(any(not(feature = "crc-table"), test))]
const fn crc8_bitwise(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 0x1 == 0x1 {
            (crc >> 1) ^ CRC8_POLY
        } else {
            crc >> 1
        };
        bit += 1;
    }
    crc
}

#[cfg(feature = "crc-table")]
static CRC8_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        let mut crc = idx as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x1 == 0x1 {
                (crc >> 1) ^ CRC8_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[idx] = crc;
        idx += 1;
    }
    table
};

#[derive(Debug, Default, Clone, Copy)]
/// Calculate the 16-bit CRC used to protect 1-Wire data payloads.
///
/// Devices transmit the one's complement of the running CRC, least significant
/// byte first. [`OneWireCrc16::compute`] returns the value in that same form, so
/// it can be compared directly against what a device sent.
pub struct OneWireCrc16(u16);

const CRC16_POLY: u16 = 0xa001;

const fn crc16_table_entry(idx: u8) -> u16 {
    let mut crc = idx as u16;
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 0x1 == 0x1 {
            (crc >> 1) ^ CRC16_POLY
        } else {
            crc >> 1
        };
        bit += 1;
    }
    crc
}

/// Low byte of each table entry.
static CRC16_LO: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = crc16_table_entry(idx as u8) as u8;
        idx += 1;
    }
    table
};

/// High byte of each table entry.
static CRC16_HI: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = (crc16_table_entry(idx as u8) >> 8) as u8;
        idx += 1;
    }
    table
};

impl OneWireCrc16 {
    /// Running (non-inverted) CRC value.
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Inverted CRC, as a device would transmit it.
    pub fn checksum(&self) -> u16 {
        !self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        let [lo, hi] = self.0.to_le_bytes();
        let idx = (lo ^ byte) as usize;
        self.0 = u16::from_le_bytes([hi ^ CRC16_LO[idx], CRC16_HI[idx]]);
    }

    /// Inverted CRC-16 of `data`.
    pub fn compute(data: &[u8]) -> u16 {
        let mut crc = OneWireCrc16::default();
        for &byte in data.iter() {
            crc.update(byte);
        }
        crc.checksum()
    }

    /// Validate a payload whose last two bytes are the device-sent CRC-16
    /// (inverted, least significant byte first).
    pub fn validate(sequence: &[u8]) -> bool {
        match sequence.len().checked_sub(2) {
            Some(split) => {
                let (data, trailer) = sequence.split_at(split);
                Self::compute(data) == u16::from_le_bytes([trailer[0], trailer[1]])
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn application_note_rom_is_valid() {
        let rom = [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2];
        assert_eq!(OneWireCrc::compute(&rom[..7]), 0xa2);
        assert!(OneWireCrc::validate(&rom));
        assert!(OneWireCrc::validate_rom(u64::from_le_bytes(rom)));
    }

    #[test]
    fn single_bit_errors_are_detected() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let mut rom = [0u8; 8];
            rng.fill(&mut rom[..7]);
            rom[7] = OneWireCrc::compute(&rom[..7]);
            let rom = u64::from_le_bytes(rom);
            assert!(OneWireCrc::validate_rom(rom));
            for bit in 0..64 {
                assert!(!OneWireCrc::validate_rom(rom ^ (1u64 << bit)), "bit {bit}");
            }
        }
    }

    #[test]
    fn table_matches_bitwise() {
        for crc in 0..=255u8 {
            for byte in [0x00, 0x01, 0x5a, 0x80, 0xff] {
                let mut table = OneWireCrc(crc);
                table.update(byte);
                assert_eq!(table.value(), crc8_bitwise(crc, byte));
            }
        }
    }

    #[test]
    fn crc16_check_value() {
        // CRC-16/ARC check value is 0xbb3d, devices send it inverted.
        assert_eq!(OneWireCrc16::compute(b"123456789"), !0xbb3d);
        assert_eq!(OneWireCrc16::compute(&[]), 0xffff);
    }

    #[test]
    fn crc16_trailer_round_trip() {
        let mut rng = rand::rng();
        for len in [1usize, 3, 8, 11, 32] {
            let mut payload = [0u8; 34];
            rng.fill(&mut payload[..len]);
            let crc = OneWireCrc16::compute(&payload[..len]).to_le_bytes();
            payload[len] = crc[0];
            payload[len + 1] = crc[1];
            assert!(OneWireCrc16::validate(&payload[..len + 2]));
            payload[0] ^= 0x10;
            assert!(!OneWireCrc16::validate(&payload[..len + 2]));
        }
        assert!(!OneWireCrc16::validate(&[0xff]));
    }
}
