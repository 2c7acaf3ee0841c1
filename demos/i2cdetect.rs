use ft232h_tmp100 as hal;
use hal::{I2cTransactor, Probe};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ftdi://ftdi:ft232h/1".to_string());
    let mut bus = I2cTransactor::open_url(&url, 100_000)?;

    println!("     0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f");
    for row in 0..8u8 {
        print!("{:02x}: ", row << 4);
        for col in 0..16u8 {
            let addr = (row << 4) | col;
            match bus.probe(addr)? {
                Probe::Present => print!("{:02x} ", addr),
                Probe::Absent => print!("-- "),
                Probe::TransportError => print!("EE "),
            }
        }
        println!();
    }

    bus.disconnect()?;
    Ok(())
}
