//! Conversions between TMP100 register contents and physical values.

use super::registers::{ConfigurationFlags, Resolution, config};
use crate::error::ErrorKind;

/// Convert the two temperature register bytes (MSB first) to °C.
///
/// The register is left-justified; the unused low bits are shifted out
/// before scaling. The value is treated as unsigned.
///
/// # Example
///
/// ```
/// use ft232h_tmp100::tmp100::{codec, Resolution};
///
/// assert_eq!(codec::decode_temperature([0x19, 0x00], Resolution::Bits12), 25.0);
/// assert_eq!(codec::decode_temperature([0x19, 0x80], Resolution::Bits9), 25.5);
/// ```
pub fn decode_temperature(bytes: [u8; 2], resolution: Resolution) -> f32 {
    let raw: u16 = u16::from_be_bytes(bytes) >> (16 - resolution.bits());
    f32::from(raw) * resolution.lsb()
}

/// Convert °C to the two bytes written to a limit register.
///
/// The count is rounded down and packed right-aligned, MSB first; it is not
/// shifted back into the left-justified layout that
/// [`decode_temperature`] reads.
pub fn encode_temperature(celsius: f32, resolution: Resolution) -> [u8; 2] {
    let raw: i32 = (celsius / resolution.lsb()).floor() as i32;
    [((raw >> 8) & 0xFF) as u8, (raw & 0xFF) as u8]
}

/// Configuration byte selecting `resolution`, all other bits clear.
pub fn encode_resolution_config(resolution: Resolution) -> u8 {
    resolution.config_bits()
}

/// Configuration byte for a resolution given in bits.
pub fn encode_resolution_bits(bits: u8) -> Result<u8, ErrorKind> {
    Resolution::try_from(bits).map(encode_resolution_config)
}

/// Split a configuration byte into its flags.
///
/// The R1:R0 bits of `byte` are not decoded, `resolution` is reported
/// as given.
pub fn decode_configuration(byte: u8, resolution: Resolution) -> ConfigurationFlags {
    ConfigurationFlags {
        shutdown: byte & config::SD != 0,
        thermostat_mode: byte & config::TM != 0,
        polarity: byte & config::POL != 0,
        fault_queue: (u8::from(byte & config::F1 != 0) << 1) | u8::from(byte & config::F0 != 0),
        resolution,
        one_shot: byte & config::OS != 0,
    }
}
