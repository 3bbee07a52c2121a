use crate::types::PowerDomain;
use embedded_hal::spi::ErrorKind;
use std::error;
use std::fmt;
use std::time::Duration;

/// Represents errors that can occur during OPC-N3 operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The device echoed a chip-select fault sentinel, or never became ready after the
    /// SPI buffer was reset. Contains the last echoed byte.
    LinkFault { code: u8 },

    /// The readiness poll ran past its wall-clock deadline.
    Timeout { elapsed: Duration },

    /// The trailing checksum of a frame does not match its payload.
    ChecksumMismatch { expected: u16, computed: u16 },

    /// A power command was not acknowledged and the power status readback disagrees
    /// with the requested state.
    PowerAckMismatch {
        domain: PowerDomain,
        requested: bool,
        ack: u8,
    },

    /// The SPI bus reported an error.
    Spi(ErrorKind),

    /// An argument is out of its valid range. Contains a description of the problem.
    InvalidArgument { description: String },

    /// The operation was cancelled through a `CancelToken`.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LinkFault { code } => write!(f, "link fault (echoed {:#04X})", code),
            Error::Timeout { elapsed } => write!(f, "operation timeout after {:?}", elapsed),
            Error::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch: frame says {:#06X}, computed {:#06X}",
                expected, computed
            ),
            Error::PowerAckMismatch {
                domain,
                requested,
                ack,
            } => write!(
                f,
                "{} did not switch {} (ack {:#04X}, status disagrees)",
                domain,
                if *requested { "on" } else { "off" },
                ack
            ),
            Error::Spi(kind) => write!(f, "spi error: {}", kind),
            Error::InvalidArgument { description } => {
                write!(f, "invalid argument: {}", description)
            }
            Error::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl error::Error for Error {}

/// A specialized `Result` type for OPC-N3 operations.
pub type Result<T> = std::result::Result<T, Error>;
