//! FTDI device URLs.

use crate::error::ErrorKind;
use std::fmt;
use std::str::FromStr;

/// FTDI USB vendor ID.
const FTDI_VID: u16 = 0x0403;

/// Known product names and their USB product IDs.
const PRODUCTS: [(&str, u16); 6] = [
    ("232h", 0x6014),
    ("ft232h", 0x6014),
    ("2232h", 0x6010),
    ("ft2232h", 0x6010),
    ("4232h", 0x6011),
    ("ft4232h", 0x6011),
];

/// Location of an FTDI device.
///
/// Parsed from `ftdi://[vendor[:product[:serial]]]/interface`.
/// Vendor and product are names (`ftdi`, `ft232h`, `ft2232h`, `ft4232h`) or
/// hexadecimal IDs (`0x0403`). Missing parts default to an FT232H.
/// The interface is `1` to `4` (A to D).
///
/// # Example
///
/// ```
/// use ft232h_tmp100::DeviceUrl;
///
/// let url: DeviceUrl = "ftdi://ftdi:2232h/2".parse()?;
/// assert_eq!(url.vendor_id(), 0x0403);
/// assert_eq!(url.product_id(), 0x6010);
/// assert_eq!(url.interface(), 2);
/// # Ok::<(), ft232h_tmp100::ErrorKind>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUrl {
    vendor_id: u16,
    product_id: u16,
    serial: Option<String>,
    interface: u8,
}

impl Default for DeviceUrl {
    /// `ftdi://ftdi:ft232h/1`
    fn default() -> Self {
        DeviceUrl {
            vendor_id: FTDI_VID,
            product_id: 0x6014,
            serial: None,
            interface: 1,
        }
    }
}

impl DeviceUrl {
    /// USB vendor ID.
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// USB product ID.
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// Serial number, if one was given.
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Interface number, 1 to 4.
    pub fn interface(&self) -> u8 {
        self.interface
    }
}

fn parse_hex(s: &str) -> Option<u16> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u16::from_str_radix(digits, 16).ok()
}

fn parse_vendor(s: &str) -> Result<u16, ErrorKind> {
    match s {
        "" | "ftdi" => Ok(FTDI_VID),
        _ => parse_hex(s).ok_or(ErrorKind::InvalidUrl),
    }
}

fn parse_product(s: &str) -> Result<u16, ErrorKind> {
    if s.is_empty() {
        return Ok(DeviceUrl::default().product_id);
    }
    let name = s.to_ascii_lowercase();
    PRODUCTS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, pid)| pid)
        .or_else(|| parse_hex(s))
        .ok_or(ErrorKind::InvalidUrl)
}

impl FromStr for DeviceUrl {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("ftdi://").ok_or(ErrorKind::InvalidUrl)?;
        let (device, interface) = rest.rsplit_once('/').ok_or(ErrorKind::InvalidUrl)?;

        let interface: u8 = interface.parse().map_err(|_| ErrorKind::InvalidUrl)?;
        if !(1..=4).contains(&interface) {
            return Err(ErrorKind::InvalidUrl);
        }

        let mut parts = device.splitn(3, ':');
        let vendor_id = parse_vendor(parts.next().unwrap_or(""))?;
        let product_id = parse_product(parts.next().unwrap_or(""))?;
        let serial = parts
            .next()
            .filter(|serial| !serial.is_empty())
            .map(str::to_owned);

        Ok(DeviceUrl {
            vendor_id,
            product_id,
            serial,
            interface,
        })
    }
}

impl fmt::Display for DeviceUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ftdi://0x{:04x}:0x{:04x}", self.vendor_id, self.product_id)?;
        if let Some(serial) = &self.serial {
            write!(f, ":{serial}")?;
        }
        write!(f, "/{}", self.interface)
    }
}
