mod common;

use common::{Call, FakeBus};
use ft232h_tmp100::tmp100::{Address, ConfigurationFlags, Resolution, Tmp100};
use ft232h_tmp100::{Error, ErrorKind, I2cTransactor};

fn bus_with_sensor(address: u8) -> (FakeBus, I2cTransactor<FakeBus>) {
    let fake = FakeBus::with_peripherals(&[address]);
    let bus = I2cTransactor::connected(fake.clone());
    (fake, bus)
}

#[test]
fn construction_writes_resolution() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let sensor = Tmp100::new(&mut bus, "00", 12).unwrap();

    assert_eq!(sensor.address(), Address::Addr48);
    assert_eq!(sensor.resolution(), Resolution::Bits12);
    assert_eq!(fake.calls(), vec![Call::Write(0x48, vec![0x01, 0x60])]);
}

#[test]
fn selectors_pick_the_address() {
    for (selector, address) in [("00", 0x48), ("01", 0x49), ("10", 0x4A), ("11", 0x4B)] {
        let (fake, mut bus) = bus_with_sensor(address);
        Tmp100::new(&mut bus, selector, 9).unwrap();
        assert_eq!(fake.calls(), vec![Call::Write(address, vec![0x01, 0x00])]);
    }
}

#[test]
fn invalid_resolution_touches_nothing() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    for bits in [0, 8, 13, 16] {
        assert!(matches!(
            Tmp100::new(&mut bus, "00", bits),
            Err(Error::Hal(ErrorKind::InvalidResolution))
        ));
    }
    assert!(fake.calls().is_empty());
}

#[test]
fn invalid_selector_touches_nothing() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    for selector in ["", "2", "0", "22", "000", "ab"] {
        assert!(matches!(
            Tmp100::new(&mut bus, selector, 12),
            Err(Error::Hal(ErrorKind::InvalidResolution))
        ));
    }
    assert!(fake.calls().is_empty());
}

#[test]
fn disconnected_bus() {
    let mut bus: I2cTransactor<FakeBus> = I2cTransactor::new();
    assert!(matches!(
        Tmp100::new(&mut bus, "00", 12),
        Err(Error::Hal(ErrorKind::NotConnected))
    ));
}

#[test]
fn read_temperature_at_12_bits() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::with_config(&mut bus, Address::Addr48, Resolution::Bits12).unwrap();
    fake.state.borrow_mut().set_register(0x48, 0x00, &[0x19, 0x00]);
    fake.clear_calls();

    assert_eq!(sensor.read_temperature().unwrap(), 25.0);
    assert_eq!(
        fake.calls(),
        vec![Call::Write(0x48, vec![0x00]), Call::Read(0x48, 2)]
    );
}

#[test]
fn read_temperature_at_9_bits() {
    let (fake, mut bus) = bus_with_sensor(0x4B);
    let mut sensor = Tmp100::new(&mut bus, "11", 9).unwrap();
    fake.state.borrow_mut().set_register(0x4B, 0x00, &[0x19, 0x80]);

    assert_eq!(sensor.read_temperature().unwrap(), 25.5);
}

#[test]
fn read_failure_is_returned() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.state.borrow_mut().broken.insert(0x48);

    assert!(matches!(sensor.read_temperature(), Err(Error::Backend(_))));
    assert!(matches!(sensor.get_configuration(), Err(Error::Backend(_))));
}

#[test]
fn short_reads_are_read_errors() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.state.borrow_mut().set_register(0x48, 0x00, &[0x19, 0x00]);

    fake.state.borrow_mut().short_read = Some(1);
    assert!(matches!(
        sensor.read_temperature(),
        Err(Error::Hal(ErrorKind::ReadError))
    ));

    fake.state.borrow_mut().short_read = Some(0);
    assert!(matches!(
        sensor.read_temperature(),
        Err(Error::Hal(ErrorKind::ReadError))
    ));
    assert!(matches!(
        sensor.get_configuration(),
        Err(Error::Hal(ErrorKind::ReadError))
    ));

    fake.state.borrow_mut().short_read = None;
    assert_eq!(sensor.read_temperature().unwrap(), 25.0);
}

#[test]
fn limits_are_written_to_their_registers() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.clear_calls();

    sensor.set_high_limit(30.0).unwrap();
    sensor.set_low_limit(20.0).unwrap();
    assert_eq!(
        fake.calls(),
        vec![
            Call::Write(0x48, vec![0x02, 0x01, 0xE0]),
            Call::Write(0x48, vec![0x03, 0x01, 0x40]),
        ]
    );
}

#[test]
fn limits_follow_the_current_resolution() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 9).unwrap();

    sensor.set_high_limit(30.0).unwrap();
    assert_eq!(fake.state.borrow().register(0x48, 0x02), Some(&[0x00, 0x3C][..]));
}

#[test]
fn set_resolution_rewrites_configuration() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.clear_calls();

    sensor.set_resolution(Resolution::Bits11).unwrap();
    assert_eq!(sensor.resolution(), Resolution::Bits11);
    assert_eq!(fake.calls(), vec![Call::Write(0x48, vec![0x01, 0x40])]);
}

#[test]
fn set_resolution_keeps_value_when_write_fails() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.state.borrow_mut().broken.insert(0x48);

    assert!(sensor.set_resolution(Resolution::Bits10).is_err());
    assert_eq!(sensor.resolution(), Resolution::Bits10);
}

#[test]
fn get_configuration_decodes_flags() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
    fake.state.borrow_mut().set_register(0x48, 0x01, &[0x65]);
    fake.clear_calls();

    assert_eq!(
        sensor.get_configuration().unwrap(),
        ConfigurationFlags {
            shutdown: true,
            thermostat_mode: false,
            polarity: true,
            fault_queue: 0,
            resolution: Resolution::Bits12,
            one_shot: false,
        }
    );
    assert_eq!(
        fake.calls(),
        vec![Call::Write(0x48, vec![0x01]), Call::Read(0x48, 1)]
    );
}

#[test]
fn get_configuration_reports_session_resolution() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    let mut sensor = Tmp100::new(&mut bus, "00", 10).unwrap();
    fake.state.borrow_mut().set_register(0x48, 0x01, &[0x78]);

    let flags = sensor.get_configuration().unwrap();
    assert_eq!(flags.resolution, Resolution::Bits10);
    assert_eq!(flags.fault_queue, 3);
}

#[test]
fn session_releases_the_bus() {
    let (fake, mut bus) = bus_with_sensor(0x48);
    {
        let mut sensor = Tmp100::new(&mut bus, "00", 12).unwrap();
        sensor.set_high_limit(30.0).unwrap();
    }
    fake.clear_calls();
    assert_eq!(bus.scan_bus().unwrap(), vec![0x48]);
}
