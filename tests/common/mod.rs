#![allow(dead_code)]

use ft232h_tmp100::{BusBackend, Error, ErrorKind};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::rc::Rc;

/// One call into the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Write(u8, Vec<u8>),
    Read(u8, usize),
    Start,
    Stop,
    WriteByte(u8),
    ReadByte(bool),
    Close,
}

/// Peripheral with a register pointer.
#[derive(Debug, Default)]
pub struct Peripheral {
    pub pointer: u8,
    pub registers: HashMap<u8, Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct State {
    pub calls: Vec<Call>,
    pub peripherals: HashMap<u8, Peripheral>,
    /// Addresses whose transactions fail at the transport level.
    pub broken: BTreeSet<u8>,
    /// Cap on the bytes any read delivers.
    pub short_read: Option<usize>,
}

impl State {
    pub fn register(&self, address: u8, register: u8) -> Option<&[u8]> {
        self.peripherals
            .get(&address)?
            .registers
            .get(&register)
            .map(Vec::as_slice)
    }

    pub fn set_register(&mut self, address: u8, register: u8, bytes: &[u8]) {
        self.peripherals
            .entry(address)
            .or_default()
            .registers
            .insert(register, bytes.to_vec());
    }
}

/// Scripted in-memory I2C bus, cloned handles share state.
#[derive(Debug, Clone, Default)]
pub struct FakeBus {
    pub state: Rc<RefCell<State>>,
}

impl FakeBus {
    pub fn with_peripherals(addresses: &[u8]) -> FakeBus {
        let bus = FakeBus::default();
        for &address in addresses {
            bus.state
                .borrow_mut()
                .peripherals
                .insert(address, Peripheral::default());
        }
        bus
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn check(state: &State, address: u8) -> Result<(), Error<io::Error>> {
        if state.broken.contains(&address) {
            Err(Error::Backend(io::Error::other("bus timeout")))
        } else if state.peripherals.contains_key(&address) {
            Ok(())
        } else {
            Err(Error::Hal(ErrorKind::I2cNoAck))
        }
    }
}

impl BusBackend for FakeBus {
    type Error = io::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<io::Error>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Write(address, bytes.to_vec()));
        FakeBus::check(&state, address)?;

        let peripheral = state.peripherals.entry(address).or_default();
        if let Some((&pointer, payload)) = bytes.split_first() {
            peripheral.pointer = pointer;
            if !payload.is_empty() {
                peripheral.registers.insert(pointer, payload.to_vec());
            }
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<usize, Error<io::Error>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Read(address, buffer.len()));
        FakeBus::check(&state, address)?;

        let peripheral = &state.peripherals[&address];
        let data = peripheral
            .registers
            .get(&peripheral.pointer)
            .cloned()
            .unwrap_or_default();
        let count = state.short_read.map_or(buffer.len(), |cap| cap.min(buffer.len()));
        for (idx, byte) in buffer[..count].iter_mut().enumerate() {
            *byte = data.get(idx).copied().unwrap_or(0x00);
        }
        Ok(count)
    }

    fn start(&mut self) -> Result<(), Error<io::Error>> {
        self.state.borrow_mut().calls.push(Call::Start);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error<io::Error>> {
        self.state.borrow_mut().calls.push(Call::Stop);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<bool, Error<io::Error>> {
        self.state.borrow_mut().calls.push(Call::WriteByte(byte));
        Ok(byte & 1 == 0)
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, Error<io::Error>> {
        self.state.borrow_mut().calls.push(Call::ReadByte(ack));
        Ok(0xA5)
    }

    fn close(&mut self) -> Result<(), Error<io::Error>> {
        self.state.borrow_mut().calls.push(Call::Close);
        Ok(())
    }
}
