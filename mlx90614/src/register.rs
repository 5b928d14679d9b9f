// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::convert::TryFrom;

use num_enum::{FromPrimitive, IntoPrimitive};
use paste::paste;

use crate::address::{Command, EepromAddress, SpecialCommand};
use crate::error::LibraryError;
use crate::util::{field, is_bit_set, mask};

/// Trait for common register functionality.
pub trait Register: Copy + From<u16> + Into<u16> {
    /// A bit mask of which bits can be modified by the controller.
    ///
    /// When changing register values on the sensor, the current value should be read, then
    /// bitwise-ANDed with the complement of this mask, then bitwise-ORd with the new value. This
    /// preserves the values of any reserved or factory calibrated bits in the registers.
    fn write_mask() -> u16;

    /// The command used to access this register.
    fn address() -> Command;

    /// Merge the writeable bits of `self` into the `current` raw value of the register.
    fn merge_into(self, current: u16) -> u16 {
        let new: u16 = self.into();
        (current & !Self::write_mask()) | (new & Self::write_mask())
    }
}

/// DRY macro for the accessor methods on the register types.
///
/// Fields the controller shouldn't modify only get a getter.
macro_rules! register_field {
    { get $field:ident, $typ:ty, $doc:literal } => {
        #[doc = $doc]
        pub fn $field(&self) -> $typ {
            self.$field
        }
    };
    { $field:ident, $typ:ty, $doc:literal } => {
        register_field! { get $field, $typ, $doc }

        paste! {
            #[doc = $doc]
            pub fn [< set_ $field >](&mut self, new_value: $typ) {
                self.$field = new_value;
            }
        }
    };
}

/// The flags register (command 0xF0).
///
/// This register is read-only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadFlags {
    /// The power-on initialization routine is still running.
    ///
    /// The bit on the sensor is low active, this field is not.
    pub(crate) initializing: bool,

    /// An EEPROM double error has occurred.
    pub(crate) eeprom_dead: bool,

    /// The previous EEPROM write or erase is still in progress.
    pub(crate) eeprom_busy: bool,
}

impl ReadFlags {
    register_field! { get initializing, bool, "Whether power-on initialization is still running." }

    register_field! { get eeprom_dead, bool, "Whether an EEPROM double error has occurred." }

    register_field! { get eeprom_busy, bool, "Whether an EEPROM write or erase is in progress." }
}

impl Register for ReadFlags {
    fn write_mask() -> u16 {
        0x0000
    }

    fn address() -> Command {
        SpecialCommand::ReadFlags.into()
    }
}

impl From<u16> for ReadFlags {
    fn from(raw: u16) -> Self {
        Self {
            initializing: !is_bit_set(raw, 4),
            eeprom_dead: is_bit_set(raw, 5),
            eeprom_busy: is_bit_set(raw, 7),
        }
    }
}

impl From<ReadFlags> for u16 {
    fn from(flags: ReadFlags) -> Self {
        let mut raw = 0u16;
        raw |= (!flags.initializing as u16) << 4;
        raw |= (flags.eeprom_dead as u16) << 5;
        raw |= (flags.eeprom_busy as u16) << 7;
        raw
    }
}

/// How the PWM output repeats.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum PwmMode {
    #[num_enum(default)]
    Extended = 0,

    Single = 1,
}

/// The PWM control register (EEPROM 0x22).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// skip formatting in here as rustfmt will remove the extra blank lines around the "extra" bit
// comments.
#[rustfmt::skip]
pub struct PwmControl {
    // The fields in this struct are laid out in least to most significant bits they occupy in the
    // register.

    pub(crate) pwm_mode: PwmMode,

    pub(crate) pwm_enabled: bool,

    /// When set SDA is push-pull, otherwise it's open drain.
    pub(crate) sda_push_pull: bool,

    /// Select thermal relay mode instead of PWM.
    pub(crate) thermal_relay: bool,

    /// The PWM repetition number, 0 to 62 in steps of two.
    pub(crate) repetition: u8,

    // `repetition` takes up five bits.

    pub(crate) period: u8,

    // `period` takes up the remaining seven bits.
}

impl PwmControl {
    const REPETITION_WIDTH: u32 = 5;

    const PERIOD_WIDTH: u32 = 7;

    register_field! { pwm_mode, PwmMode, "PWM extended or single mode." }

    register_field! { pwm_enabled, bool, "Whether the PWM output is enabled." }

    register_field! { sda_push_pull, bool, "Drive SDA push-pull instead of open drain." }

    register_field! { thermal_relay, bool, "Use thermal relay mode instead of PWM." }

    register_field! { get repetition, u8, "The raw PWM repetition number." }

    register_field! { get period, u8, "The raw PWM period." }

    /// Set the raw PWM repetition number. Only the lower five bits are available.
    pub fn set_repetition(&mut self, repetition: u8) -> Result<(), LibraryError> {
        if u16::from(repetition) > mask(Self::REPETITION_WIDTH) {
            Err(LibraryError::InvalidArgument(
                "PWM repetition must fit in five bits",
            ))
        } else {
            self.repetition = repetition;
            Ok(())
        }
    }

    /// Set the raw PWM period. Only the lower seven bits are available.
    pub fn set_period(&mut self, period: u8) -> Result<(), LibraryError> {
        if u16::from(period) > mask(Self::PERIOD_WIDTH) {
            Err(LibraryError::InvalidArgument("PWM period must fit in seven bits"))
        } else {
            self.period = period;
            Ok(())
        }
    }
}

impl Register for PwmControl {
    fn write_mask() -> u16 {
        0xFFFF
    }

    fn address() -> Command {
        EepromAddress::PwmControl.into()
    }
}

impl From<u16> for PwmControl {
    fn from(raw: u16) -> Self {
        Self {
            pwm_mode: PwmMode::from_primitive(field(raw, 0, 1) as u8),
            pwm_enabled: is_bit_set(raw, 1),
            sda_push_pull: is_bit_set(raw, 2),
            thermal_relay: is_bit_set(raw, 3),
            repetition: field(raw, 4, Self::REPETITION_WIDTH) as u8,
            period: field(raw, 9, Self::PERIOD_WIDTH) as u8,
        }
    }
}

impl From<PwmControl> for u16 {
    fn from(register: PwmControl) -> Self {
        let mut raw = 0u16;
        raw |= u8::from(register.pwm_mode) as u16;
        raw |= (register.pwm_enabled as u16) << 1;
        raw |= (register.sda_push_pull as u16) << 2;
        raw |= (register.thermal_relay as u16) << 3;
        raw |= (register.repetition as u16 & mask(PwmControl::REPETITION_WIDTH)) << 4;
        raw |= (register.period as u16 & mask(PwmControl::PERIOD_WIDTH)) << 9;
        raw
    }
}

/// The IIR filter setting.
///
/// The percentages are the a<sub>1</sub> coefficient of the filter (so 100% is no filtering).
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Iir {
    /// a<sub>1</sub> = 0.5, b<sub>1</sub> = 0.5
    #[num_enum(default)]
    Percent50 = 0,

    /// a<sub>1</sub> = 0.25, b<sub>1</sub> = 0.75
    Percent25 = 1,

    /// a<sub>1</sub> = 0.1666, b<sub>1</sub> = 0.8333
    Percent17 = 2,

    /// a<sub>1</sub> = 0.125, b<sub>1</sub> = 0.875
    Percent13 = 3,

    /// a<sub>1</sub> = 1, b<sub>1</sub> = 0. The filter is bypassed.
    Percent100 = 4,

    /// a<sub>1</sub> = 0.8, b<sub>1</sub> = 0.2
    Percent80 = 5,

    /// a<sub>1</sub> = 0.666, b<sub>1</sub> = 0.333
    Percent67 = 6,

    /// a<sub>1</sub> = 0.571, b<sub>1</sub> = 0.428
    Percent57 = 7,
}

/// Which temperatures the PWM output and the sensor's own processing use.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum TemperatureSelection {
    /// T<sub>a</sub> and T<sub>obj1</sub>.
    #[num_enum(default)]
    AmbientObject1 = 0,

    /// T<sub>a</sub> and T<sub>obj2</sub>.
    AmbientObject2 = 1,

    /// T<sub>obj2</sub> only.
    Object2 = 2,

    /// T<sub>obj1</sub> and T<sub>obj2</sub>.
    Object1Object2 = 3,
}

/// The length of the FIR filter.
///
/// The datasheet recommends against lengths below 128.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Fir {
    Eight = 0,

    Sixteen = 1,

    ThirtyTwo = 2,

    SixtyFour = 3,

    OneTwentyEight = 4,

    TwoFiftySix = 5,

    FiveTwelve = 6,

    #[num_enum(default)]
    TenTwentyFour = 7,
}

impl Fir {
    /// The number of taps in the filter.
    pub fn length(&self) -> u16 {
        8 << u8::from(*self)
    }
}

impl TryFrom<u16> for Fir {
    type Error = LibraryError;

    /// Attempt to create a `Fir` from a filter length.
    ///
    /// ```
    /// # use core::convert::TryFrom;
    /// # use mlx90614::Fir;
    /// assert_eq!(Fir::try_from(128u16), Ok(Fir::OneTwentyEight));
    /// assert!(Fir::try_from(100u16).is_err());
    /// ```
    fn try_from(length: u16) -> Result<Self, Self::Error> {
        if length.is_power_of_two() && (8..=1024).contains(&length) {
            // 8 is 2^3, so the raw value is the exponent less three.
            Ok(Self::from_primitive((length.trailing_zeros() - 3) as u8))
        } else {
            Err(LibraryError::InvalidArgument(
                "The given number does not match a valid FIR filter length",
            ))
        }
    }
}

/// Configuration register 1 (EEPROM 0x25).
///
/// Several of these bits are set at the factory as part of the calibration. They're exposed
/// read-only, and the [write mask][Register::write_mask] keeps them from being modified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[rustfmt::skip]
pub struct ConfigRegister {
    pub(crate) iir: Iir,

    // `iir` takes up three bits.

    /// Repeat sensor test. Factory set, do not modify.
    pub(crate) repeat_sensor_test: bool,

    pub(crate) temperature_selection: TemperatureSelection,

    // `temperature_selection` takes up two bits.

    /// Dual IR sensor when set, single otherwise.
    pub(crate) dual_sensor: bool,

    /// Sign of K<sub>s</sub>. Factory set, do not modify.
    pub(crate) ks_sign: bool,

    pub(crate) fir: Fir,

    // `fir` takes up three bits.

    /// Amplifier gain. Factory set, do not modify.
    pub(crate) gain: u8,

    // `gain` takes up three bits.

    /// Sign of K<sub>t2</sub>. Factory set, do not modify.
    pub(crate) kt2_sign: bool,

    /// The sensor test is disabled when set.
    pub(crate) sensor_test_disabled: bool,
}

impl ConfigRegister {
    register_field! { iir, Iir, "The IIR filter setting." }

    register_field! { get repeat_sensor_test, bool, "Whether the sensor test is repeated." }

    register_field! {
        temperature_selection,
        TemperatureSelection,
        "The temperatures used for PWM output."
    }

    register_field! { dual_sensor, bool, "Whether the sensor has two IR channels." }

    register_field! { get ks_sign, bool, "The sign of the K<sub>s</sub> coefficient." }

    register_field! { fir, Fir, "The FIR filter length." }

    register_field! { get gain, u8, "The raw amplifier gain setting." }

    register_field! { get kt2_sign, bool, "The sign of the K<sub>t2</sub> coefficient." }

    register_field! { sensor_test_disabled, bool, "Whether the sensor test is disabled." }
}

impl Register for ConfigRegister {
    fn write_mask() -> u16 {
        // IIR, temperature selection, dual sensor, FIR and sensor test
        0x8777
    }

    fn address() -> Command {
        EepromAddress::ConfigRegister1.into()
    }
}

impl From<u16> for ConfigRegister {
    fn from(raw: u16) -> Self {
        Self {
            iir: Iir::from_primitive(field(raw, 0, 3) as u8),
            repeat_sensor_test: is_bit_set(raw, 3),
            temperature_selection: TemperatureSelection::from_primitive(field(raw, 4, 2) as u8),
            dual_sensor: is_bit_set(raw, 6),
            ks_sign: is_bit_set(raw, 7),
            fir: Fir::from_primitive(field(raw, 8, 3) as u8),
            gain: field(raw, 11, 3) as u8,
            kt2_sign: is_bit_set(raw, 14),
            sensor_test_disabled: is_bit_set(raw, 15),
        }
    }
}

impl From<ConfigRegister> for u16 {
    fn from(register: ConfigRegister) -> Self {
        let mut raw = 0u16;
        raw |= u8::from(register.iir) as u16;
        raw |= (register.repeat_sensor_test as u16) << 3;
        raw |= (u8::from(register.temperature_selection) as u16) << 4;
        raw |= (register.dual_sensor as u16) << 6;
        raw |= (register.ks_sign as u16) << 7;
        raw |= (u8::from(register.fir) as u16) << 8;
        raw |= (register.gain as u16 & mask(3)) << 11;
        raw |= (register.kt2_sign as u16) << 14;
        raw |= (register.sensor_test_disabled as u16) << 15;
        raw
    }
}
