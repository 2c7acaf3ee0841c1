//! TI TMP100 digital temperature sensor.
//!
//! # Example
//!
//! ```no_run
//! use ft232h_tmp100 as hal;
//! use hal::tmp100::{Address, Resolution, Tmp100};
//!
//! # #[cfg(feature = "ftdi")]
//! # {
//! let mut bus = hal::I2cTransactor::open_url("ftdi://ftdi:ft232h/1", 100_000)?;
//! let mut sensor = Tmp100::with_config(&mut bus, Address::Addr48, Resolution::Bits12)?;
//!
//! sensor.set_high_limit(30.0)?;
//! sensor.set_low_limit(20.0)?;
//! println!("{:.2} °C", sensor.read_temperature()?);
//! println!("{:?}", sensor.get_configuration()?);
//! # }
//! # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
mod registers;

pub use registers::{Address, ConfigurationFlags, Register, Resolution};

use crate::bus::{BusBackend, I2cTransactor};
use crate::error::{Error, ErrorKind};

/// One TMP100 on a bus.
///
/// The session borrows the transactor mutably, so no other transaction can
/// run on the bus while the session is alive.
#[derive(Debug)]
pub struct Tmp100<'a, B: BusBackend> {
    bus: &'a mut I2cTransactor<B>,
    address: Address,
    resolution: Resolution,
}

impl<'a, B: BusBackend> Tmp100<'a, B> {
    /// Create a session from an address selector (`"00"` to `"11"`) and a
    /// resolution in bits (9 to 12).
    ///
    /// Both arguments are validated before the bus is touched, either one
    /// being out of range fails with [`ErrorKind::InvalidResolution`].
    /// On success the configuration register is written with the resolution.
    pub fn new(
        bus: &'a mut I2cTransactor<B>,
        selector: &str,
        resolution: u8,
    ) -> Result<Self, Error<B::Error>> {
        let address: Address = selector.parse()?;
        let resolution = Resolution::try_from(resolution)?;
        Tmp100::with_config(bus, address, resolution)
    }

    /// Create a session and write the configuration register with
    /// `resolution`.
    pub fn with_config(
        bus: &'a mut I2cTransactor<B>,
        address: Address,
        resolution: Resolution,
    ) -> Result<Self, Error<B::Error>> {
        let mut sensor = Tmp100 {
            bus,
            address,
            resolution,
        };
        sensor.configure()?;
        Ok(sensor)
    }

    /// Bus address of the sensor.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Resolution the sensor was last configured with.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn configure(&mut self) -> Result<(), Error<B::Error>> {
        let config = codec::encode_resolution_config(self.resolution);
        self.write(Register::Configuration, &[config])
    }

    fn write(&mut self, register: Register, payload: &[u8]) -> Result<(), Error<B::Error>> {
        debug_assert_eq!(payload.len(), register.width());
        self.bus
            .write_register(self.address.into(), register.into(), payload)
    }

    /// Read the full width of `register`, anything shorter is a
    /// [`ErrorKind::ReadError`].
    fn read<const N: usize>(&mut self, register: Register) -> Result<[u8; N], Error<B::Error>> {
        let data = self
            .bus
            .read_register(self.address.into(), register.into(), register.width())?;
        <[u8; N]>::try_from(data.as_slice()).map_err(|_| {
            log::warn!(
                "TMP100 0x{:02x}: read {} of {} bytes",
                u8::from(self.address),
                data.len(),
                register.width()
            );
            Error::Hal(ErrorKind::ReadError)
        })
    }

    /// Read the current temperature in °C.
    pub fn read_temperature(&mut self) -> Result<f32, Error<B::Error>> {
        let bytes: [u8; 2] = self.read(Register::Temperature)?;
        Ok(codec::decode_temperature(bytes, self.resolution))
    }

    /// Write the high limit register.
    pub fn set_high_limit(&mut self, celsius: f32) -> Result<(), Error<B::Error>> {
        let bytes = codec::encode_temperature(celsius, self.resolution);
        self.write(Register::TempHigh, &bytes)
    }

    /// Write the low limit register.
    pub fn set_low_limit(&mut self, celsius: f32) -> Result<(), Error<B::Error>> {
        let bytes = codec::encode_temperature(celsius, self.resolution);
        self.write(Register::TempLow, &bytes)
    }

    /// Change the resolution and rewrite the configuration register.
    ///
    /// The new resolution is kept even if the write fails.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<B::Error>> {
        log::debug!(
            "TMP100 0x{:02x}: resolution {} -> {} bits",
            u8::from(self.address),
            self.resolution.bits(),
            resolution.bits()
        );
        self.resolution = resolution;
        self.configure()
    }

    /// Read and decode the configuration register.
    pub fn get_configuration(&mut self) -> Result<ConfigurationFlags, Error<B::Error>> {
        let [byte]: [u8; 1] = self.read(Register::Configuration)?;
        Ok(codec::decode_configuration(byte, self.resolution))
    }
}
