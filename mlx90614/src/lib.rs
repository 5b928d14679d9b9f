//! A pure-Rust library for accessing the MLX90614 family of infrared thermometers over I²C.
//!
//! The MLX90614 speaks SMBus, with a Packet Error Code (PEC) on every transaction. Temperatures
//! are read from RAM, and configuration (emissivity, the SMBus address, filter settings and the
//! PWM output) lives in EEPROM. This crate has two levels of API, a high-level driver that checks
//! every PEC, converts temperatures into your preferred unit and handles the EEPROM erase/write
//! cycle for you, and a low-level API for reading and writing raw words directly.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C and delay traits, meaning you should
//! be able to use this library on other platforms, as long as there's an `embedded-hal` I²C
//! implementation available. This library is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # High-Level API
//! ```no_run
//! use linux_embedded_hal::{Delay, I2cdev};
//! use mlx90614::{Channel, Mlx90614, TemperatureUnit, DEFAULT_ADDRESS};
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! let mut sensor = Mlx90614::new(i2c_bus, Delay, DEFAULT_ADDRESS)?;
//! // Temperatures are in degrees Celsius unless told otherwise
//! let object = sensor.object_temperature(Channel::One)?;
//! sensor.set_unit(TemperatureUnit::Fahrenheit);
//! let ambient = sensor.ambient_temperature()?;
//! println!("Object {}℃, ambient {}℉", object, ambient);
//! # Ok::<(), mlx90614::Error<I2cdev>>(())
//! ```
//! This snippet reads the object temperature from the first IR channel and the ambient
//! temperature from a sensor on I²C bus #1 (`/dev/i2c-1`) at the default address (`0x5A`).
//! Creating the driver reads the sensor's identification number, so a missing or misbehaving
//! sensor is reported immediately.
//!
//! Reads that fail their PEC check are reported as
//! [`ChecksumMismatch`][LibraryError::ChecksumMismatch] errors, and temperatures the sensor has
//! flagged as invalid (for example channel two on a single zone sensor) are reported as
//! [`MeasurementError`][LibraryError::MeasurementError]. Nothing is retried automatically.
//!
//! # Low-Level API
//! The [`smbus`] module exposes the individual word reads and writes, and [`pec`] has the CRC-8
//! calculations they're built on. Register layouts are in [`register`], and the memory map is in
//! [`address`].
//!
//! # EEPROM Writes
//! EEPROM cells have to be erased (written with zero) before a new value can be written. The
//! driver takes care of that, waiting [5ms][driver::T_ERASE_MS] after the erase and
//! [another 5ms][driver::T_WRITE_MS] after the write, so every EEPROM setter blocks for at least
//! 10ms. The EEPROM has a limited number of write cycles, so avoid writing it in a loop.

#![no_std]
#![allow(clippy::float_cmp)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("Either the 'std' or 'libm' feature must be enabled.");

pub mod address;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod pec;
pub mod register;
pub mod smbus;
mod temperature;
mod util;

#[cfg(test)]
mod test;

pub use address::{Channel, Command, EepromAddress, RamAddress, SpecialCommand, DEFAULT_ADDRESS};
#[doc(inline)]
pub use driver::Mlx90614;
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use register::*;
pub use temperature::{TemperatureUnit, KELVINS_PER_COUNT};
