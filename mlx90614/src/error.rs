// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::blocking::i2c;

/// Errors that don't involve I²C.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LibraryError {
    /// The Packet Error Code sent by the sensor did not match the one computed from the received
    /// bytes.
    ChecksumMismatch {
        /// The PEC computed locally over the transaction.
        computed: u8,
        /// The PEC byte the sensor sent.
        received: u8,
    },

    /// The sensor flagged a temperature reading as invalid (the most significant bit of the RAM
    /// cell was set).
    MeasurementError,

    /// An argument was outside of the range the sensor accepts. No I²C traffic was generated.
    InvalidArgument(&'static str),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::ChecksumMismatch { computed, received } => write!(
                f,
                "PEC mismatch (computed {:#04X}, received {:#04X})",
                computed, received
            ),
            LibraryError::MeasurementError => write!(f, "sensor flagged the reading as invalid"),
            LibraryError::InvalidArgument(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LibraryError {}

pub enum Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Errors from the I²C implementation during a combined write-read transaction.
    I2cWriteReadError(<I2C as i2c::WriteRead>::Error),

    /// Errors from the I²C implementation during a write transaction.
    I2cWriteError(<I2C as i2c::Write>::Error),

    /// Errors originating from within this library.
    LibraryError(LibraryError),
}

impl<I2C> Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Whether the I²C transaction itself failed, as opposed to the data being untrustworthy.
    pub fn is_bus_error(&self) -> bool {
        !matches!(self, Error::LibraryError(_))
    }
}

// Custom Debug implementation so that I2C doesn't need to implement Debug (like the one from
// linux-embedded-hal).
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => f
                .debug_tuple("Error::I2cWriteReadError")
                .field(i2c_error)
                .finish(),
            Error::I2cWriteError(i2c_error) => f
                .debug_tuple("Error::I2cWriteError")
                .field(i2c_error)
                .finish(),
            Error::LibraryError(err) => f.debug_tuple("Error::LibraryError").field(err).finish(),
        }
    }
}

impl<I2C> fmt::Display for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => {
                write!(f, "I2C Error (write-read): {:?}", i2c_error)
            }
            Error::I2cWriteError(i2c_error) => write!(f, "I2C Error (write): {:?}", i2c_error),
            Error::LibraryError(err) => write!(f, "Library Error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: std::error::Error + 'static,
    <I2C as i2c::Write>::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2cWriteReadError(i2c_error) => Some(i2c_error),
            Error::I2cWriteError(i2c_error) => Some(i2c_error),
            Error::LibraryError(lib_err) => Some(lib_err),
        }
    }
}

impl<I2C> From<LibraryError> for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    fn from(lib_err: LibraryError) -> Self {
        Self::LibraryError(lib_err)
    }
}
