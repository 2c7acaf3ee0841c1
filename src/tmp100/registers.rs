use crate::error::ErrorKind;
use std::str::FromStr;

/// TMP100 register pointer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Temperature result, read-only, 2 bytes.
    Temperature = 0x00,
    /// Configuration, 1 byte.
    Configuration = 0x01,
    /// High limit, 2 bytes.
    TempHigh = 0x02,
    /// Low limit, 2 bytes.
    TempLow = 0x03,
}

impl Register {
    /// Number of bytes transferred when the register is read or written.
    pub const fn width(self) -> usize {
        match self {
            Register::Configuration => 1,
            Register::Temperature | Register::TempHigh | Register::TempLow => 2,
        }
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> Self {
        register as u8
    }
}

/// Configuration register bit masks.
pub(crate) mod config {
    /// Shutdown mode
    pub const SD: u8 = 0x01;
    /// Thermostat mode
    pub const TM: u8 = 0x02;
    /// Alert polarity
    pub const POL: u8 = 0x04;
    /// Fault queue, low bit
    pub const F0: u8 = 0x08;
    /// Fault queue, high bit
    pub const F1: u8 = 0x10;
    /// One-shot
    pub const OS: u8 = 0x80;
}

/// Conversion resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Resolution {
    /// 9 bits, 0.5 °C
    Bits9,
    /// 10 bits, 0.25 °C
    Bits10,
    /// 11 bits, 0.125 °C
    Bits11,
    /// 12 bits, 0.0625 °C
    #[default]
    Bits12,
}

impl Resolution {
    /// Number of significant bits in the temperature register.
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits9 => 9,
            Resolution::Bits10 => 10,
            Resolution::Bits11 => 11,
            Resolution::Bits12 => 12,
        }
    }

    /// Value of one count in °C.
    pub fn lsb(self) -> f32 {
        0.0625 * f32::from(1u16 << (12 - self.bits()))
    }

    /// R1:R0 bits of the configuration register.
    pub const fn config_bits(self) -> u8 {
        match self {
            Resolution::Bits9 => 0x00,
            Resolution::Bits10 => 0x20,
            Resolution::Bits11 => 0x40,
            Resolution::Bits12 => 0x60,
        }
    }
}

impl TryFrom<u8> for Resolution {
    type Error = ErrorKind;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            9 => Ok(Resolution::Bits9),
            10 => Ok(Resolution::Bits10),
            11 => Ok(Resolution::Bits11),
            12 => Ok(Resolution::Bits12),
            _ => Err(ErrorKind::InvalidResolution),
        }
    }
}

/// Bus address, selected by wiring the address pins.
///
/// Parsed from the two character selectors `"00"`, `"01"`, `"10"` and `"11"`.
/// Any other selector is rejected with [`ErrorKind::InvalidResolution`], the
/// same kind as an unsupported resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    /// `"00"`, 0x48
    #[default]
    Addr48,
    /// `"01"`, 0x49
    Addr49,
    /// `"10"`, 0x4A
    Addr4A,
    /// `"11"`, 0x4B
    Addr4B,
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        match address {
            Address::Addr48 => 0x48,
            Address::Addr49 => 0x49,
            Address::Addr4A => 0x4A,
            Address::Addr4B => 0x4B,
        }
    }
}

impl FromStr for Address {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "00" => Ok(Address::Addr48),
            "01" => Ok(Address::Addr49),
            "10" => Ok(Address::Addr4A),
            "11" => Ok(Address::Addr4B),
            _ => Err(ErrorKind::InvalidResolution),
        }
    }
}

/// Decoded configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationFlags {
    /// SD: conversions stopped.
    pub shutdown: bool,
    /// TM: interrupt mode instead of comparator mode.
    pub thermostat_mode: bool,
    /// POL: ALERT is active high.
    pub polarity: bool,
    /// F1:F0: consecutive faults needed to trigger ALERT, as a 0 to 3 code.
    pub fault_queue: u8,
    /// Resolution the session is configured for.
    pub resolution: Resolution,
    /// OS: one-shot conversion requested.
    pub one_shot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_from_bits() {
        for bits in 9..=12 {
            assert_eq!(Resolution::try_from(bits).unwrap().bits(), bits);
        }
        for bits in [0, 8, 13, 16, 255] {
            assert_eq!(Resolution::try_from(bits), Err(ErrorKind::InvalidResolution));
        }
    }

    #[test]
    fn lsb_sizes() {
        assert_eq!(Resolution::Bits9.lsb(), 0.5);
        assert_eq!(Resolution::Bits10.lsb(), 0.25);
        assert_eq!(Resolution::Bits11.lsb(), 0.125);
        assert_eq!(Resolution::Bits12.lsb(), 0.0625);
    }

    #[test]
    fn address_selectors() {
        let table = [("00", 0x48), ("01", 0x49), ("10", 0x4A), ("11", 0x4B)];
        for (selector, address) in table {
            assert_eq!(u8::from(selector.parse::<Address>().unwrap()), address);
        }
        assert_eq!("2".parse::<Address>(), Err(ErrorKind::InvalidResolution));
        assert_eq!("000".parse::<Address>(), Err(ErrorKind::InvalidResolution));
    }

    #[test]
    fn register_widths() {
        assert_eq!(Register::Temperature.width(), 2);
        assert_eq!(Register::Configuration.width(), 1);
        assert_eq!(Register::TempHigh.width(), 2);
        assert_eq!(Register::TempLow.width(), 2);
    }
}
