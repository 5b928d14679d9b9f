// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between the sensor's linearized temperature and physical units.
//!
//! The sensor reports temperatures as unsigned counts of 0.02 K from absolute zero. The same
//! representation is used for the object temperature range in EEPROM.

// Various floating point operations are not implemented in core, so we use libm to provide them as
// needed.
#[cfg_attr(feature = "std", allow(unused_imports))]
use num_traits::Float;

use crate::error::LibraryError;

/// The resolution of a linearized temperature, in kelvins.
pub const KELVINS_PER_COUNT: f32 = 0.02;

/// Offset between kelvins and degrees Celsius.
const KELVINS_TO_CELSIUS: f32 = 273.15;

/// The units temperatures are reported and accepted in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TemperatureUnit {
    /// The linearized value straight from the sensor, with no scaling.
    Raw,

    Kelvin,

    /// Degrees Celsius, which is the default.
    Celsius,

    Fahrenheit,
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        Self::Celsius
    }
}

impl TemperatureUnit {
    /// Convert a linearized temperature into this unit.
    /// ```
    /// # use mlx90614::TemperatureUnit;
    /// let celsius = TemperatureUnit::Celsius.from_linear(13715);
    /// assert!((celsius - 1.15).abs() < 0.001);
    /// assert_eq!(TemperatureUnit::Raw.from_linear(13715), 13715.0);
    /// ```
    pub fn from_linear(&self, linear: u16) -> f32 {
        let kelvin = f32::from(linear) * KELVINS_PER_COUNT;
        match self {
            Self::Raw => f32::from(linear),
            Self::Kelvin => kelvin,
            Self::Celsius => kelvin - KELVINS_TO_CELSIUS,
            Self::Fahrenheit => (kelvin - KELVINS_TO_CELSIUS) * 9.0 / 5.0 + 32.0,
        }
    }

    /// Convert a temperature in this unit into the sensor's linearized representation.
    ///
    /// The result is rounded to the nearest count. Values that can't be represented (negative
    /// kelvins, anything past 0xFFFF counts, NaN) are rejected.
    pub fn to_linear(&self, value: f32) -> Result<u16, LibraryError> {
        let counts = match self {
            Self::Raw => value,
            Self::Kelvin => value / KELVINS_PER_COUNT,
            Self::Celsius => (value + KELVINS_TO_CELSIUS) / KELVINS_PER_COUNT,
            Self::Fahrenheit => {
                ((value - 32.0) * 5.0 / 9.0 + KELVINS_TO_CELSIUS) / KELVINS_PER_COUNT
            }
        }
        .round();
        if counts.is_finite() && (0.0..=f32::from(u16::MAX)).contains(&counts) {
            Ok(counts as u16)
        } else {
            Err(LibraryError::InvalidArgument(
                "Temperature is outside of the range the sensor can represent",
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::TemperatureUnit;

    #[test]
    fn default_unit() {
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::Celsius);
    }

    #[test]
    fn linear_to_units() {
        assert_approx_eq!(
            f32,
            TemperatureUnit::Kelvin.from_linear(13715),
            274.3,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            TemperatureUnit::Celsius.from_linear(13715),
            1.15,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            TemperatureUnit::Fahrenheit.from_linear(13715),
            34.07,
            epsilon = 0.1
        );
        assert_eq!(TemperatureUnit::Raw.from_linear(13715), 13715.0);
    }

    #[test]
    fn freezing_point() {
        // 273.15 K isn't a multiple of 0.02 K, so 0 ℃ lands between two counts.
        assert_approx_eq!(
            f32,
            TemperatureUnit::Celsius.from_linear(13658),
            0.01,
            epsilon = 0.001
        );
        assert_approx_eq!(
            f32,
            TemperatureUnit::Fahrenheit.from_linear(13658),
            32.018,
            epsilon = 0.01
        );
    }

    #[test]
    fn celsius_round_trip() {
        let celsius = TemperatureUnit::Celsius.from_linear(13715);
        let linear = TemperatureUnit::Celsius.to_linear(celsius).unwrap();
        assert!((i32::from(linear) - 13715).abs() <= 1, "Got {}", linear);
    }

    #[test]
    fn physical_units_round_trip() {
        let units = [
            TemperatureUnit::Kelvin,
            TemperatureUnit::Celsius,
            TemperatureUnit::Fahrenheit,
        ];
        for unit in units.iter() {
            for linear in (0x2D00u16..0x7FFF).step_by(97) {
                let converted = unit.from_linear(linear);
                let back = unit.to_linear(converted).unwrap();
                assert!(
                    (i32::from(back) - i32::from(linear)).abs() <= 1,
                    "{:?}: {} became {}",
                    unit,
                    linear,
                    back
                );
            }
        }
    }

    #[test]
    fn raw_round_trip_is_exact() {
        for linear in [0u16, 1, 13715, 0x7FFF, 0xFFFF].iter() {
            let raw = TemperatureUnit::Raw.from_linear(*linear);
            assert_eq!(TemperatureUnit::Raw.to_linear(raw), Ok(*linear));
        }
    }

    #[test]
    fn unrepresentable_temperatures() {
        assert!(TemperatureUnit::Kelvin.to_linear(-1.0).is_err());
        assert!(TemperatureUnit::Celsius.to_linear(-300.0).is_err());
        assert!(TemperatureUnit::Celsius.to_linear(1100.0).is_err());
        assert!(TemperatureUnit::Raw.to_linear(65536.0).is_err());
        assert!(TemperatureUnit::Fahrenheit.to_linear(f32::NAN).is_err());
    }
}
