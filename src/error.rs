//! Error taxonomy shared by every accessor operation.
//!
//! Errors are plain values; no operation panics on bad input. On any failure
//! the accessor's observable state (cursor, available bytes, window size,
//! coverage log) is left exactly as it was before the call.

use core::fmt;
use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure cases surfaced by accessor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pre-condition on the call itself was violated: width above the
    /// maximum integer width, pop of an empty cursor stack, a Pascal string
    /// longer than 255 bytes, an empty delimiter, and similar.
    InvalidParameter,
    /// A read or seek would land past the end of the window, or a scan
    /// (string terminator, delimiter) ran out of window before finding its
    /// target.
    BeyondEnd,
    /// An allocation could not be satisfied.
    OutOfMemory,
    /// An underlying OS call failed mid-operation (short read, failed seek).
    Host(io::ErrorKind),
    /// A file could not be opened.
    Open(io::ErrorKind),
    /// The bytes themselves are malformed, e.g. a variable-length integer
    /// that never terminates within its maximum encoded size.
    InvalidReadData,
    /// A write to the output file failed or was short.
    Write(io::ErrorKind),
    /// A write operation was attempted on an accessor that is not
    /// write-enabled.
    ReadOnly,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter => write!(f, "invalid parameter"),
            Error::BeyondEnd => write!(f, "beyond end of window"),
            Error::OutOfMemory => write!(f, "allocation failed"),
            Error::Host(kind) => write!(f, "host call failed: {kind}"),
            Error::Open(kind) => write!(f, "cannot open file: {kind}"),
            Error::InvalidReadData => write!(f, "malformed data"),
            Error::Write(kind) => write!(f, "write failed: {kind}"),
            Error::ReadOnly => write!(f, "accessor is read-only"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Classifies an I/O error raised while reading or seeking.
    #[inline]
    pub(crate) fn host(e: io::Error) -> Error {
        Error::Host(e.kind())
    }

    /// Classifies an I/O error raised while opening a file.
    #[inline]
    pub(crate) fn open(e: io::Error) -> Error {
        Error::Open(e.kind())
    }

    /// Classifies an I/O error raised while flushing output.
    #[inline]
    pub(crate) fn write(e: io::Error) -> Error {
        Error::Write(e.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert_eq!(Error::BeyondEnd.to_string(), "beyond end of window");
        assert_eq!(Error::ReadOnly.to_string(), "accessor is read-only");
    }

    #[test]
    fn io_kind_is_preserved() {
        let e = Error::open(io::Error::new(io::ErrorKind::NotFound, "x"));
        assert_eq!(e, Error::Open(io::ErrorKind::NotFound));
    }
}
