//! Register-oriented I2C transactions on top of a [`BusBackend`].

use crate::error::{Error, ErrorKind};

/// Highest valid 7-bit I2C address.
pub const MAX_ADDRESS: u8 = 0x7F;

/// Physical I2C transport.
///
/// [`write`](BusBackend::write) and [`read`](BusBackend::read) each perform a
/// complete transaction: START, address, payload, STOP.
/// The remaining methods are raw framing primitives for protocols that need
/// to drive the bus by hand.
///
/// A peer that does not acknowledge its address must be reported as
/// [`ErrorKind::I2cNoAck`], anything else is a transport failure.
pub trait BusBackend {
    /// Transport error type.
    type Error: std::error::Error;

    /// Addressed write of `bytes`. An empty slice only sends the address.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<Self::Error>>;

    /// Addressed read into `buffer`, returns the number of bytes received.
    ///
    /// A count below `buffer.len()` is a short read. An empty buffer only
    /// sends the address.
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<usize, Error<Self::Error>>;

    /// Generate a START condition.
    fn start(&mut self) -> Result<(), Error<Self::Error>>;

    /// Generate a STOP condition.
    fn stop(&mut self) -> Result<(), Error<Self::Error>>;

    /// Clock out one byte, returns `true` if the peer acknowledged it.
    fn write_byte(&mut self, byte: u8) -> Result<bool, Error<Self::Error>>;

    /// Clock in one byte, then send ACK (`true`) or NACK (`false`).
    fn read_byte(&mut self, ack: bool) -> Result<u8, Error<Self::Error>>;

    /// Release the transport. Called once when the transactor disconnects.
    fn close(&mut self) -> Result<(), Error<Self::Error>> {
        Ok(())
    }
}

/// Outcome of probing a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The address was acknowledged.
    Present,
    /// Nothing acknowledged the address.
    Absent,
    /// The transport failed while probing.
    TransportError,
}

/// Result of a full bus scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Acknowledged addresses in ascending order.
    pub present: Vec<u8>,
    /// Number of addresses that were not acknowledged.
    pub absent: usize,
    /// Number of probes that failed at the transport level.
    pub transport_errors: usize,
}

#[derive(Debug)]
enum Link<B> {
    Disconnected,
    Connected(B),
}

/// I2C transaction layer.
///
/// Owns the bus backend while connected. Every operation fails with
/// [`ErrorKind::NotConnected`] while disconnected.
///
/// # Example
///
/// ```
/// use ft232h_tmp100::{ErrorKind, Error, I2cTransactor, I2c};
///
/// # #[cfg(feature = "ftdi")]
/// # {
/// let mut bus: I2cTransactor<I2c<ftdi::Device>> = I2cTransactor::new();
/// assert!(matches!(
///     bus.scan_bus(),
///     Err(Error::Hal(ErrorKind::NotConnected))
/// ));
/// # }
/// ```
#[derive(Debug)]
pub struct I2cTransactor<B> {
    link: Link<B>,
}

impl<B> Default for I2cTransactor<B> {
    fn default() -> Self {
        I2cTransactor {
            link: Link::Disconnected,
        }
    }
}

impl<B: BusBackend> I2cTransactor<B> {
    /// Create a disconnected transactor.
    pub fn new() -> I2cTransactor<B> {
        I2cTransactor::default()
    }

    /// Create a transactor that is already connected to `backend`.
    pub fn connected(backend: B) -> I2cTransactor<B> {
        I2cTransactor {
            link: Link::Connected(backend),
        }
    }

    /// Connect to `backend`.
    ///
    /// A previously connected backend is closed first.
    pub fn connect(&mut self, backend: B) -> Result<(), Error<B::Error>> {
        self.disconnect()?;
        self.link = Link::Connected(backend);
        log::info!("I2C bus connected");
        Ok(())
    }

    /// Close the backend and return to the disconnected state.
    ///
    /// Disconnecting a disconnected transactor does nothing.
    pub fn disconnect(&mut self) -> Result<(), Error<B::Error>> {
        match std::mem::replace(&mut self.link, Link::Disconnected) {
            Link::Connected(mut backend) => {
                backend.close()?;
                log::info!("I2C bus closed");
                Ok(())
            }
            Link::Disconnected => Ok(()),
        }
    }

    /// Returns `true` while a backend is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self.link, Link::Connected(_))
    }

    fn backend(&mut self) -> Result<&mut B, Error<B::Error>> {
        match &mut self.link {
            Link::Connected(backend) => Ok(backend),
            Link::Disconnected => Err(Error::Hal(ErrorKind::NotConnected)),
        }
    }

    fn addressed(&mut self, address: u8) -> Result<&mut B, Error<B::Error>> {
        let backend = self.backend()?;
        if address > MAX_ADDRESS {
            return Err(Error::Hal(ErrorKind::InvalidAddress));
        }
        Ok(backend)
    }

    /// Probe a single address with a zero-length write.
    pub fn probe(&mut self, address: u8) -> Result<Probe, Error<B::Error>> {
        let backend = self.addressed(address)?;
        Ok(match backend.write(address, &[]) {
            Ok(()) => Probe::Present,
            Err(Error::Hal(ErrorKind::I2cNoAck)) => Probe::Absent,
            Err(e) => {
                log::debug!("Probe of 0x{address:02x} failed: {e}");
                Probe::TransportError
            }
        })
    }

    /// Probe every address from 0x00 to 0x7F.
    pub fn scan(&mut self) -> Result<ScanReport, Error<B::Error>> {
        let mut report = ScanReport::default();
        for address in 0..=MAX_ADDRESS {
            match self.probe(address)? {
                Probe::Present => report.present.push(address),
                Probe::Absent => report.absent += 1,
                Probe::TransportError => report.transport_errors += 1,
            }
        }
        log::debug!(
            "I2C scan: {} present, {} absent, {} transport errors",
            report.present.len(),
            report.absent,
            report.transport_errors
        );
        Ok(report)
    }

    /// Addresses that acknowledged a zero-length write, in ascending order.
    ///
    /// Per-address failures count as absent devices. Only
    /// [`ErrorKind::NotConnected`] is returned as an error.
    pub fn scan_bus(&mut self) -> Result<Vec<u8>, Error<B::Error>> {
        Ok(self.scan()?.present)
    }

    /// Write `payload` to `register` as a single addressed write.
    pub fn write_register(
        &mut self,
        address: u8,
        register: u8,
        payload: &[u8],
    ) -> Result<(), Error<B::Error>> {
        let backend = self.addressed(address)?;
        let mut frame: Vec<u8> = Vec::with_capacity(1 + payload.len());
        frame.push(register);
        frame.extend_from_slice(payload);

        log::trace!("0x{address:02x}[0x{register:02x}] <- {payload:02x?}");
        backend.write(address, &frame).inspect_err(|e| {
            log::warn!("Register write 0x{address:02x}[0x{register:02x}] failed: {e}")
        })
    }

    /// Set the register pointer with a write of `[register]`, then read
    /// `length` bytes.
    ///
    /// The returned data is shorter than `length` if the backend reported a
    /// short read.
    ///
    /// Both transactions complete before this returns; nothing else can use
    /// the bus in between because the transactor is borrowed mutably.
    pub fn read_register(
        &mut self,
        address: u8,
        register: u8,
        length: usize,
    ) -> Result<Vec<u8>, Error<B::Error>> {
        let backend = self.addressed(address)?;
        let mut buffer: Vec<u8> = vec![0; length];
        let count = backend
            .write(address, &[register])
            .and_then(|()| backend.read(address, &mut buffer))
            .inspect_err(|e| {
                log::warn!("Register read 0x{address:02x}[0x{register:02x}] failed: {e}")
            })?;
        buffer.truncate(count);

        log::trace!("0x{address:02x}[0x{register:02x}] -> {buffer:02x?}");
        Ok(buffer)
    }

    /// Raw addressed write without a register pointer.
    pub fn write_data(&mut self, address: u8, payload: &[u8]) -> Result<(), Error<B::Error>> {
        self.addressed(address)?.write(address, payload)
    }

    /// Raw addressed read of up to `length` bytes without a register pointer.
    pub fn read_data(&mut self, address: u8, length: usize) -> Result<Vec<u8>, Error<B::Error>> {
        let mut buffer: Vec<u8> = vec![0; length];
        let count = self.addressed(address)?.read(address, &mut buffer)?;
        buffer.truncate(count);
        Ok(buffer)
    }

    /// Generate a START condition for manual framing.
    pub fn start(&mut self) -> Result<(), Error<B::Error>> {
        self.backend()?.start()
    }

    /// Generate a STOP condition for manual framing.
    pub fn stop(&mut self) -> Result<(), Error<B::Error>> {
        self.backend()?.stop()
    }

    /// Clock out a byte after [`start`](Self::start), returns the ACK state.
    pub fn write_byte(&mut self, byte: u8) -> Result<bool, Error<B::Error>> {
        self.backend()?.write_byte(byte)
    }

    /// Clock in a byte after [`start`](Self::start).
    pub fn read_byte(&mut self, ack: bool) -> Result<u8, Error<B::Error>> {
        self.backend()?.read_byte(ack)
    }
}
