use std::fmt;
use std::io;

/// Error type.
#[derive(Debug)]
pub enum Error<E: std::error::Error> {
    /// Crate specific error.
    Hal(ErrorKind),
    /// IO error.
    Io(io::Error),
    /// Backend specific error.
    Backend(E),
}

/// Internal errors
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No ACK from the I2C slave
    I2cNoAck,
    /// The bus was used before it was connected, or after it was closed.
    NotConnected,
    /// TMP100 setting rejected: a resolution outside of 9, 10, 11 or 12 bits,
    /// or an address selector other than `"00"`, `"01"`, `"10"`, `"11"`.
    InvalidResolution,
    /// Address does not fit in 7 bits.
    InvalidAddress,
    /// A read returned fewer bytes than requested.
    ReadError,
    /// The I2C pins are already claimed.
    PinInUse,
    /// The device URL could not be parsed.
    InvalidUrl,
}

impl ErrorKind {
    fn as_str(&self) -> &str {
        match *self {
            ErrorKind::I2cNoAck => "No ACK from slave",
            ErrorKind::NotConnected => "Bus is not connected",
            ErrorKind::InvalidResolution => "Invalid TMP100 resolution or address selector",
            ErrorKind::InvalidAddress => "Invalid I2C address",
            ErrorKind::ReadError => "Short read from device",
            ErrorKind::PinInUse => "I2C pins are already in use",
            ErrorKind::InvalidUrl => "Invalid FTDI device URL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ErrorKind {}

impl<E: std::error::Error> eh1::i2c::Error for Error<E> {
    fn kind(&self) -> eh1::i2c::ErrorKind {
        match self {
            Error::Hal(ErrorKind::I2cNoAck) => {
                eh1::i2c::ErrorKind::NoAcknowledge(eh1::i2c::NoAcknowledgeSource::Unknown)
            }
            _ => eh1::i2c::ErrorKind::Other,
        }
    }
}

impl<E: std::error::Error> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => e.fmt(f),
            Error::Backend(e) => fmt::Display::fmt(&e, f),
            Error::Hal(e) => write!(f, "{}", e.as_str()),
        }
    }
}

impl<E: std::error::Error> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => e.source(),
            Error::Backend(e) => e.source(),
            Error::Hal(_) => None,
        }
    }
}

impl<E: std::error::Error> From<io::Error> for Error<E> {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl<E: std::error::Error> From<ErrorKind> for Error<E> {
    fn from(kind: ErrorKind) -> Self {
        Error::Hal(kind)
    }
}

#[cfg(feature = "libftd2xx")]
impl From<libftd2xx::TimeoutError> for Error<libftd2xx::TimeoutError> {
    fn from(e: libftd2xx::TimeoutError) -> Self {
        Error::Backend(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eh1::i2c::Error as _;

    #[test]
    fn executor_io_errors_are_io() {
        let err: Error<io::Error> = io::Error::new(io::ErrorKind::TimedOut, "usb").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), eh1::i2c::ErrorKind::Other);
        assert_eq!(err.to_string(), "usb");
    }

    #[test]
    fn nack_maps_to_no_acknowledge() {
        let err: Error<io::Error> = ErrorKind::I2cNoAck.into();
        assert_eq!(
            err.kind(),
            eh1::i2c::ErrorKind::NoAcknowledge(eh1::i2c::NoAcknowledgeSource::Unknown)
        );
        assert_eq!(err.to_string(), "No ACK from slave");
    }
}
