//! I2C register transactions and a TMP100 temperature sensor driver for the
//! FTDI FT232H USB bridge.
//!
//! The FTDI MPSSE engine is driven through the [ftdi-mpsse] command builder,
//! with either the [libftd2xx] (FTDI D2XX) or the [ftdi] (libftdi1) crate
//! moving the bytes over USB.
//!
//! The crate is layered:
//!
//! * [`FtHal`] opens and initializes the FTDI device and hands out the
//!   [`I2c`] bus.
//! * [`I2c`] implements [`BusBackend`] (and the [embedded-hal] I2C traits).
//! * [`I2cTransactor`] adds the connection lifecycle, bus scanning and the
//!   register pointer access pattern.
//! * [`Tmp100`] is a TI TMP100 session on top of the transactor.
//!
//! **Note:**
//! This is strictly a development tool.
//!
//! # Features
//!
//! * `ftdi` enables the libftdi1 backend and [`FtHal::open_url`].
//! * `libftd2xx` enables the FTDI D2XX backend.
//!
//! # Example
//!
//! ```no_run
//! use ft232h_tmp100 as hal;
//!
//! # #[cfg(feature = "ftdi")]
//! # {
//! let mut bus = hal::I2cTransactor::open_url("ftdi://ftdi:ft232h/1", 100_000)?;
//! println!("{:02x?}", bus.scan_bus()?);
//!
//! let mut sensor = hal::Tmp100::new(&mut bus, "00", 12)?;
//! println!("{:.2} °C", sensor.read_temperature()?);
//! # }
//! # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
//! ```
//!
//! # Limitations
//!
//! * Only the I2C engine of the MPSSE is used.
//! * AD1 and AD2 must be shorted together to form SDA.
//!
//! [embedded-hal]: https://github.com/rust-embedded/embedded-hal
//! [ftdi-mpsse]: https://github.com/ftdi-rs/ftdi-mpsse
//! [libftd2xx]: https://github.com/ftdi-rs/libftd2xx
//! [ftdi]: https://github.com/tanriol/ftdi-rs
#![doc(html_root_url = "https://docs.rs/ft232h-tmp100/0.1.0")]
#![forbid(missing_docs)]
#![forbid(unsafe_code)]

pub use eh0;
pub use eh1;
pub use ftdi_mpsse;

#[cfg(feature = "ftdi")]
pub use ftdi;

#[cfg(feature = "libftd2xx")]
pub use libftd2xx;

mod bus;
mod error;
mod i2c;
pub mod tmp100;
mod url;

pub use bus::{BusBackend, I2cTransactor, MAX_ADDRESS, Probe, ScanReport};
pub use error::{Error, ErrorKind};
pub use i2c::I2c;
pub use tmp100::Tmp100;
pub use url::DeviceUrl;

use ftdi_mpsse::{MpsseCmdExecutor, MpsseSettings};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct FtInner<Device: MpsseCmdExecutor> {
    /// FTDI device.
    ft: Device,
    /// GPIO direction of the lower byte.
    direction: u8,
    /// GPIO value of the lower byte.
    value: u8,
    /// Pins of the lower byte that are claimed.
    allocated: u8,
}

impl<Device: MpsseCmdExecutor> FtInner<Device> {
    /// Claim the pins in `mask`.
    fn allocate_pins(&mut self, mask: u8) -> Result<(), ErrorKind> {
        if self.allocated & mask != 0 {
            return Err(ErrorKind::PinInUse);
        }
        self.allocated |= mask;
        Ok(())
    }

    /// Return the pins in `mask`.
    fn release_pins(&mut self, mask: u8) {
        self.allocated &= !mask;
    }
}

impl<Device: MpsseCmdExecutor> From<Device> for FtInner<Device> {
    fn from(ft: Device) -> Self {
        FtInner {
            ft,
            direction: 0x00,
            value: 0x00,
            allocated: 0x00,
        }
    }
}

/// FTxxx device.
#[derive(Debug)]
pub struct FtHal<Device: MpsseCmdExecutor> {
    mtx: Arc<Mutex<FtInner<Device>>>,
}

impl<Device, E> FtHal<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    /// Initialize the FTDI MPSSE with sane defaults.
    ///
    /// Default values:
    ///
    /// * Reset the FTDI device.
    /// * 4k USB transfer size.
    /// * 1s USB read timeout.
    /// * 1s USB write timeout.
    /// * 16ms latency timer.
    /// * 100kHz clock frequency.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ft232h_tmp100 as hal;
    ///
    /// # #[cfg(feature = "libftd2xx")]
    /// # {
    /// let device = libftd2xx::Ft232h::with_description("Single RS232-HS")?;
    /// let hal = hal::FtHal::init_default(device)?;
    /// # }
    /// # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
    /// ```
    pub fn init_default(device: Device) -> Result<FtHal<Device>, Error<E>> {
        let settings: MpsseSettings = MpsseSettings {
            clock_frequency: Some(100_000),
            ..Default::default()
        };

        FtHal::init(device, &settings)
    }

    /// Initialize the FTDI MPSSE with sane defaults and custom frequency
    ///
    /// **Note:** The actual I2C clock will be 2/3 of `freq` because of the
    /// 3-phase data clocking.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ft232h_tmp100 as hal;
    ///
    /// # #[cfg(feature = "ftdi")]
    /// # {
    /// let device = ftdi::find_by_vid_pid(0x0403, 0x6014)
    ///     .interface(ftdi::Interface::A)
    ///     .open()?;
    /// let hal = hal::FtHal::init_freq(device, 400_000)?;
    /// # }
    /// # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
    /// ```
    pub fn init_freq(device: Device, freq: u32) -> Result<FtHal<Device>, Error<E>> {
        let settings: MpsseSettings = MpsseSettings {
            clock_frequency: Some(freq),
            ..Default::default()
        };

        FtHal::init(device, &settings)
    }

    /// Initialize the FTDI MPSSE with custom values.
    ///
    /// **Note:** The `mask` field of [`MpsseSettings`] is ignored for this function.
    ///
    /// [`MpsseSettings`]: ftdi_mpsse::MpsseSettings
    pub fn init(
        mut device: Device,
        mpsse_settings: &MpsseSettings,
    ) -> Result<FtHal<Device>, Error<E>> {
        let mut settings: MpsseSettings = *mpsse_settings;
        settings.mask = 0x00;
        device.init(&settings)?;

        Ok(FtHal {
            mtx: Arc::new(Mutex::new(device.into())),
        })
    }

    /// Acquire the I2C peripheral.
    ///
    /// Pin assignments:
    /// * AD0 => SCL
    /// * AD1 => SDA
    /// * AD2 => SDA
    ///
    /// Yes, AD1 and AD2 are both SDA.
    /// These pins must be shorted together for I2C operation.
    ///
    /// Fails with [`ErrorKind::PinInUse`] while another [`I2c`] handle from
    /// this device is still open.
    pub fn i2c(&self) -> Result<I2c<Device>, Error<E>> {
        I2c::new(self.mtx.clone())
    }
}

#[cfg(feature = "ftdi")]
impl FtHal<ftdi::Device> {
    /// Open the device described by `url` through libftdi1 and initialize
    /// the MPSSE at `freq` Hz.
    ///
    /// The serial number part of the URL is not supported by this backend
    /// and is ignored; the first matching device is used.
    ///
    /// The libftdi1 executor reports failures as [`std::io::Error`], so
    /// errors opening the device are converted to that type as well.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ft232h_tmp100 as hal;
    ///
    /// let url: hal::DeviceUrl = "ftdi://ftdi:ft232h/1".parse()?;
    /// let hal = hal::FtHal::open_url(&url, 100_000)?;
    /// let i2c = hal.i2c()?;
    /// # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
    /// ```
    pub fn open_url(url: &DeviceUrl, freq: u32) -> Result<Self, Error<std::io::Error>> {
        let interface = match url.interface() {
            1 => ftdi::Interface::A,
            2 => ftdi::Interface::B,
            3 => ftdi::Interface::C,
            _ => ftdi::Interface::D,
        };
        log::debug!(
            "Opening {:04x}:{:04x} interface {}",
            url.vendor_id(),
            url.product_id(),
            url.interface()
        );
        let device = ftdi::find_by_vid_pid(url.vendor_id(), url.product_id())
            .interface(interface)
            .open()
            .map_err(std::io::Error::other)?;
        FtHal::init_freq(device, freq)
    }
}

#[cfg(feature = "ftdi")]
impl I2cTransactor<I2c<ftdi::Device>> {
    /// Open the FTDI device at `url` and connect a transactor to its I2C bus.
    ///
    /// `url` has the form `ftdi://[vendor[:product[:serial]]]/interface`,
    /// see [`DeviceUrl`].
    pub fn open_url(url: &str, frequency_hz: u32) -> Result<Self, Error<std::io::Error>> {
        let url: DeviceUrl = url.parse().map_err(Error::Hal)?;
        let hal = FtHal::open_url(&url, frequency_hz)?;
        let i2c = hal.i2c()?;
        log::info!("I2C bus connected on {url} at {frequency_hz} Hz");
        Ok(I2cTransactor::connected(i2c))
    }
}
