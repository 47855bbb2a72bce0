use std::{fmt, io};
use thiserror::Error;

/// Represents an error while reading an SMF file or scanning one of its tracks.
///
/// Every error is fatal to the file being read. There is no partial result and no attempt to
/// resynchronize the event stream after a failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes were available than a field or chunk declares.
    #[error("truncated midi: {0}")]
    Truncated(&'static str),

    /// A chunk tag or the header length is wrong, or a variable-length quantity is too long.
    #[error("invalid midi: {0}")]
    InvalidFormat(&'static str),

    /// The header declares an SMF format other than 1.
    #[error("unsupported smf format {0} (only format 1 is accepted)")]
    UnsupportedFormat(u16),

    /// A status byte or meta type whose payload size is unknown.
    ///
    /// These are never skipped by a guessed amount.
    #[error("unrecognized {0}")]
    UnrecognizedEvent(Unrecognized),

    /// The underlying file could not be opened or read.
    #[error("i/o failure: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated("unexpected end of file"),
            _ => Error::Io(err),
        }
    }
}

impl Error {
    /// Whether this error means the input ran out before a declared field or chunk ended.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated(_))
    }
}

/// The event that could not be classified, along with where it was found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unrecognized {
    /// A status byte with no defined payload size.
    Status { status: u8, offset: usize },
    /// A meta event type outside of the fixed skip table.
    Meta { kind: u8, offset: usize },
}
impl fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Unrecognized::Status { status, offset } => {
                write!(f, "status byte 0x{:02X} at track offset {}", status, offset)
            }
            Unrecognized::Meta { kind, offset } => {
                write!(f, "meta event type 0x{:02X} at track offset {}", kind, offset)
            }
        }
    }
}

macro_rules! err_invalid {
    ($msg:expr) => {
        Error::InvalidFormat($msg)
    };
}
macro_rules! err_truncated {
    ($msg:expr) => {
        Error::Truncated($msg)
    };
}

/// The result type used by the MIDI parser.
pub type Result<T> = std::result::Result<T, Error>;
