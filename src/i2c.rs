use crate::FtInner;
use crate::bus::BusBackend;
use crate::error::Error;
use crate::error::ErrorKind::I2cNoAck;
use eh1::i2c::Operation;
use ftdi_mpsse::{ClockBitsIn, ClockBitsOut, MpsseCmdBuilder, MpsseCmdExecutor};
use std::sync::{Arc, Mutex};

/// SCL bitmask
const SCL: u8 = 1 << 0;
/// SDA bitmask
const SDA: u8 = 1 << 1;
/// AD0 (SCL), AD1 (SDA out) and AD2 (SDA in).
const I2C_PINS: u8 = 0x07;

const BITS_IN: ClockBitsIn = ClockBitsIn::MsbPos;
const BITS_OUT: ClockBitsOut = ClockBitsOut::MsbNeg;

/// Meaning of one byte returned by the MPSSE.
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Slave ACK bit, bit 0 is low on ACK.
    Ack,
    /// Data byte `idx` of the read operation `op`.
    Data { op: usize, idx: usize },
}

/// MPSSE command under construction and the layout of its response.
struct Pending {
    cmd: MpsseCmdBuilder,
    slots: Vec<Slot>,
}

impl Pending {
    fn new() -> Pending {
        Pending {
            cmd: MpsseCmdBuilder::new(),
            slots: Vec::new(),
        }
    }

    /// Send the queued commands and sort the response into ACKs and read
    /// buffers. Returns `false` if any ACK bit was missing.
    fn flush<D: MpsseCmdExecutor>(
        &mut self,
        ft: &mut D,
        operations: &mut [Operation<'_>],
    ) -> Result<bool, D::Error> {
        let cmd = std::mem::replace(&mut self.cmd, MpsseCmdBuilder::new()).send_immediate();
        ft.send(cmd.as_slice())?;

        let mut response: Vec<u8> = vec![0; self.slots.len()];
        if !response.is_empty() {
            ft.recv(&mut response)?;
        }

        let mut acked = true;
        for (slot, byte) in self.slots.drain(..).zip(response) {
            match slot {
                Slot::Ack => acked &= (byte & 0b1) == 0x00,
                Slot::Data { op, idx } => {
                    if let Operation::Read(buffer) = &mut operations[op] {
                        buffer[idx] = byte;
                    }
                }
            }
        }
        Ok(acked)
    }
}

/// Bi + SAK
fn clock_byte_out(cmd: MpsseCmdBuilder, value: u8, direction: u8, byte: u8) -> MpsseCmdBuilder {
    cmd.set_gpio_lower(value, SCL | SDA | direction)
        .clock_bits_out(BITS_OUT, byte, 8)
        .set_gpio_lower(value, SCL | direction)
        .clock_bits_in(BITS_IN, 1)
}

/// Bn + MAK / NMAK
fn clock_byte_in(cmd: MpsseCmdBuilder, value: u8, direction: u8, ack: bool) -> MpsseCmdBuilder {
    cmd.set_gpio_lower(value, SCL | direction)
        .clock_bits_in(BITS_IN, 8)
        .set_gpio_lower(value, SCL | SDA | direction)
        .clock_bits_out(BITS_OUT, if ack { 0x00 } else { 0x80 }, 1)
}

/// FTDI I2C interface.
///
/// This is created by calling [`FtHal::i2c`].
///
/// [`FtHal::i2c`]: crate::FtHal::i2c
#[derive(Debug)]
pub struct I2c<Device: MpsseCmdExecutor> {
    /// Parent FTDI device.
    mtx: Arc<Mutex<FtInner<Device>>>,
    /// Length of the start, repeated start, and stop conditions.
    ///
    /// The units for these are dimensionless number of MPSSE commands.
    /// More MPSSE commands roughly correlates to more time.
    start_stop_cmds: u8,
    /// Send I2C commands faster.
    fast: bool,
}

impl<Device, E> I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    pub(crate) fn new(mtx: Arc<Mutex<FtInner<Device>>>) -> Result<I2c<Device>, Error<E>> {
        {
            let mut lock = mtx.lock().expect("Failed to aquire FTDI mutex");

            lock.allocate_pins(I2C_PINS)?;

            // AD0: SCL
            // AD1: SDA (master out)
            // AD2: SDA (master in)
            // pins are set as input (tri-stated) in idle mode
            lock.direction &= !I2C_PINS;
            lock.value &= !I2C_PINS;

            let cmd: MpsseCmdBuilder = MpsseCmdBuilder::new()
                .set_gpio_lower(lock.value, lock.direction)
                .enable_3phase_data_clocking()
                .send_immediate();
            lock.ft.send(cmd.as_slice())?;
        }

        Ok(I2c {
            mtx,
            start_stop_cmds: 3,
            fast: false,
        })
    }

    /// Set the length of start and stop conditions.
    ///
    /// This is an advanced feature that most people will not need to touch.
    /// I2C start and stop conditions are generated with a number of MPSSE
    /// commands.  This sets the number of MPSSE command generated for each
    /// stop and start condition.  An increase in the number of MPSSE commands
    /// roughtly correlates to an increase in the duration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ft232h_tmp100 as hal;
    ///
    /// # #[cfg(feature = "ftdi")]
    /// # {
    /// let url: hal::DeviceUrl = "ftdi://ftdi:ft232h/1".parse()?;
    /// let hal = hal::FtHal::open_url(&url, 400_000)?;
    /// let mut i2c = hal.i2c()?;
    /// i2c.set_stop_start_len(10);
    /// # }
    /// # Ok::<(), std::boxed::Box<dyn std::error::Error>>(())
    /// ```
    pub fn set_stop_start_len(&mut self, start_stop_cmds: u8) {
        self.start_stop_cmds = start_stop_cmds
    }

    /// Enable faster I2C transactions by sending commands in a single write.
    ///
    /// This is disabled by default.
    ///
    /// Normally each address phase and each written byte is sent on its own
    /// and its ACK is checked before going on.
    /// Enabling this sends a whole transaction at once, and slave ACKs are
    /// only checked at the end of it.
    pub fn set_fast(&mut self, fast: bool) {
        self.fast = fast
    }

    fn start_cond(&self, mut cmd: MpsseCmdBuilder, value: u8, direction: u8) -> MpsseCmdBuilder {
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value | SCL | SDA, SCL | SDA | direction)
        }
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value | SCL, SCL | SDA | direction)
        }
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value, SCL | SDA | direction)
        }
        cmd
    }

    fn stop_cond(&self, mut cmd: MpsseCmdBuilder, value: u8, direction: u8) -> MpsseCmdBuilder {
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value, SCL | SDA | direction)
        }
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value | SCL, SCL | SDA | direction)
        }
        for _ in 0..self.start_stop_cmds {
            cmd = cmd.set_gpio_lower(value | SCL | SDA, SCL | SDA | direction)
        }
        // Idle
        cmd.set_gpio_lower(value, direction)
    }

    /// Finish the transaction after a missing ACK.
    fn abort(&self, ft: &mut Device, value: u8, direction: u8) -> Result<(), Error<E>> {
        let cmd = self
            .stop_cond(MpsseCmdBuilder::new(), value, direction)
            .send_immediate();
        ft.send(cmd.as_slice())?;
        Err(Error::Hal(I2cNoAck))
    }

    /// Run `operations` as one transaction with repeated starts whenever the
    /// direction changes.
    fn transaction_inner(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error<E>> {
        if operations.is_empty() {
            return Ok(());
        }

        // lock at the start to prevent GPIO from being modified while we build
        // the MPSSE command
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        let (value, direction) = (lock.value, lock.direction);

        let is_read: Vec<bool> = operations
            .iter()
            .map(|op| matches!(op, Operation::Read(_)))
            .collect();

        let mut pending = Pending::new();
        for op in 0..operations.len() {
            if op == 0 || is_read[op] != is_read[op - 1] {
                // ST or SR
                pending.cmd = self.start_cond(pending.cmd, value, direction);
                // SAD + R/W, SAK
                pending.cmd = pending
                    .cmd
                    .clock_bits_out(BITS_OUT, (address << 1) | u8::from(is_read[op]), 8)
                    .set_gpio_lower(value, SCL | direction)
                    .clock_bits_in(BITS_IN, 1);
                pending.slots.push(Slot::Ack);

                if !self.fast && !pending.flush(&mut lock.ft, operations)? {
                    return self.abort(&mut lock.ft, value, direction);
                }
            }

            let write_bytes: Option<Vec<u8>> = match &operations[op] {
                Operation::Write(bytes) => Some(bytes.to_vec()),
                Operation::Read(_) => None,
            };

            match write_bytes {
                Some(bytes) => {
                    for byte in bytes {
                        pending.cmd = clock_byte_out(pending.cmd, value, direction, byte);
                        pending.slots.push(Slot::Ack);
                        if !self.fast && !pending.flush(&mut lock.ft, operations)? {
                            return self.abort(&mut lock.ft, value, direction);
                        }
                    }
                }
                None => {
                    // the final byte before a direction change or stop is NMAK
                    let more_reads = operations[op + 1..]
                        .iter()
                        .take_while(|next| matches!(next, Operation::Read(_)))
                        .any(|next| matches!(next, Operation::Read(b) if !b.is_empty()));
                    let len = match &operations[op] {
                        Operation::Read(buffer) => buffer.len(),
                        Operation::Write(_) => 0,
                    };
                    for idx in 0..len {
                        let ack = more_reads || idx + 1 < len;
                        pending.cmd = clock_byte_in(pending.cmd, value, direction, ack);
                        pending.slots.push(Slot::Data { op, idx });
                    }
                }
            }
        }

        // SP
        pending.cmd = self.stop_cond(pending.cmd, value, direction);
        if pending.flush(&mut lock.ft, operations)? {
            Ok(())
        } else {
            Err(Error::Hal(I2cNoAck))
        }
    }
}

impl<Device, E> BusBackend for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    type Error = E;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        self.transaction_inner(address, &mut [Operation::Write(bytes)])
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<usize, Error<E>> {
        let len: usize = buffer.len();
        self.transaction_inner(address, &mut [Operation::Read(buffer)])?;
        Ok(len)
    }

    fn start(&mut self) -> Result<(), Error<E>> {
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        let cmd = self
            .start_cond(MpsseCmdBuilder::new(), lock.value, lock.direction)
            .send_immediate();
        lock.ft.send(cmd.as_slice())?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error<E>> {
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        let cmd = self
            .stop_cond(MpsseCmdBuilder::new(), lock.value, lock.direction)
            .send_immediate();
        lock.ft.send(cmd.as_slice())?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<bool, Error<E>> {
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        let cmd = clock_byte_out(MpsseCmdBuilder::new(), lock.value, lock.direction, byte)
            .send_immediate();
        let mut ack_buf: [u8; 1] = [0; 1];
        lock.ft.xfer(cmd.as_slice(), &mut ack_buf)?;
        Ok((ack_buf[0] & 0b1) == 0x00)
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, Error<E>> {
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        let cmd =
            clock_byte_in(MpsseCmdBuilder::new(), lock.value, lock.direction, ack).send_immediate();
        let mut buf: [u8; 1] = [0; 1];
        lock.ft.xfer(cmd.as_slice(), &mut buf)?;
        Ok(buf[0])
    }

    /// Tri-state the I2C pins and give them back to the [`FtHal`].
    ///
    /// [`FtHal`]: crate::FtHal
    fn close(&mut self) -> Result<(), Error<E>> {
        let mut lock = self.mtx.lock().expect("Failed to aquire FTDI mutex");
        lock.direction &= !I2C_PINS;
        lock.value &= !I2C_PINS;
        lock.release_pins(I2C_PINS);
        let cmd: MpsseCmdBuilder = MpsseCmdBuilder::new()
            .set_gpio_lower(lock.value, lock.direction)
            .send_immediate();
        lock.ft.send(cmd.as_slice())?;
        Ok(())
    }
}

impl<Device, E> eh0::blocking::i2c::Read for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    type Error = Error<E>;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.transaction_inner(address, &mut [Operation::Read(buffer)])
    }
}

impl<Device, E> eh0::blocking::i2c::Write for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    type Error = Error<E>;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        self.transaction_inner(addr, &mut [Operation::Write(bytes)])
    }
}

impl<Device, E> eh0::blocking::i2c::WriteRead for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    type Error = Error<E>;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.transaction_inner(
            address,
            &mut [Operation::Write(bytes), Operation::Read(buffer)],
        )
    }
}

impl<Device, E> eh1::i2c::ErrorType for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    type Error = Error<E>;
}

impl<Device, E> eh1::i2c::I2c for I2c<Device>
where
    Device: MpsseCmdExecutor<Error = E>,
    E: std::error::Error,
    Error<E>: From<E>,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transaction_inner(address, operations)
    }
}
