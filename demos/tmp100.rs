use ft232h_tmp100 as hal;
use hal::I2cTransactor;
use hal::tmp100::{Resolution, Tmp100};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut bus = I2cTransactor::open_url("ftdi://ftdi:ft232h/1", 100_000)?;
    {
        let mut sensor = Tmp100::new(&mut bus, "00", 12)?;
        println!("Temperature: {:.2} °C", sensor.read_temperature()?);

        sensor.set_high_limit(30.0)?;
        sensor.set_low_limit(20.0)?;

        let config = sensor.get_configuration()?;
        println!("Configuration: {config:#?}");

        sensor.set_resolution(Resolution::Bits11)?;
        println!(
            "Temperature at {} bits: {:.3} °C",
            sensor.resolution().bits(),
            sensor.read_temperature()?
        );
    }
    bus.disconnect()?;
    Ok(())
}
