// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::blocking::{delay::DelayMs, i2c};
use log::{debug, error, warn};
use paste::paste;

use crate::address::{Channel, Command, EepromAddress, RamAddress, SpecialCommand};
use crate::error::{Error, LibraryError};
use crate::register::*;
use crate::smbus;
use crate::temperature::TemperatureUnit;

/// Time for an EEPROM cell to erase, in milliseconds.
pub const T_ERASE_MS: u8 = 5;

/// Time for an EEPROM cell to be written, in milliseconds.
pub const T_WRITE_MS: u8 = 5;

/// The most significant bit of a RAM temperature is an error flag.
const ERROR_FLAG: u16 = 0x8000;

/// The lowest emissivity the sensor can be reliably configured for.
const MIN_EMISSIVITY: f32 = 0.1;

/// The lowest raw value written to the emissivity cell.
const MIN_EMISSIVITY_WORD: u16 = 0x2000;

/// Full scale of the emissivity cell, which is an emissivity of 1.
const EMISSIVITY_SCALE: f32 = 65535.0;

/// DRY macro for the set_* methods in `Mlx90614` that modify a register field.
///
/// The register is read, and only written back (with a full EEPROM cycle) if the field changes.
macro_rules! set_register_field {
    { $register_access:ident, $field:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn [< set_ $field >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            let mut current = self.$register_access()?;
            if current.$field() != new_value {
                current.[< set_ $field >](new_value);
                self.[< set_ $register_access >](current)
            } else {
                Ok(())
            }
        }
    }};
}

/// A driver for the MLX90614 family of infrared thermometers.
///
/// The driver holds on to the I²C bus and a delay provider for its lifetime. If the bus needs to
/// be shared with other devices, pass in a mutable reference or a shared-bus proxy instead of the
/// bus itself. Nothing except the sensor's identification number is cached; every getter reads
/// the sensor.
#[derive(Clone, Debug)]
pub struct Mlx90614<I2C, D> {
    /// The I²C bus this sensor is accessible on.
    bus: I2C,

    /// Used to wait out EEPROM erase and write times.
    delay: D,

    /// The I²C address this sensor is accessible at.
    address: u8,

    /// Temperatures are returned and accepted in this unit.
    unit: TemperatureUnit,

    /// The sensor's identification number, read when the driver was created.
    id: [u16; 4],
}

impl<I2C, D> Mlx90614<I2C, D>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u8>,
{
    /// Create a `Mlx90614` for accessing the sensor at the given I²C address.
    ///
    /// The sensor's identification number is read to confirm it's responding; if that fails the
    /// error is returned and no driver is created. The default address is
    /// [`DEFAULT_ADDRESS`][crate::DEFAULT_ADDRESS] (0x5A), and every MLX90614 also answers at
    /// 0x00.
    pub fn new(bus: I2C, delay: D, address: u8) -> Result<Self, Error<I2C>> {
        if address > 0x7F {
            return Err(LibraryError::InvalidArgument("I²C addresses are seven bits").into());
        }
        let mut driver = Self {
            bus,
            delay,
            address,
            unit: TemperatureUnit::default(),
            id: [0u16; 4],
        };
        debug!("MLX90614 ({:#04X}): reading sensor ID", address);
        if let Err(err) = driver.read_id() {
            error!("MLX90614 ({:#04X}): initialization failed", address);
            return Err(err);
        }
        Ok(driver)
    }

    /// Destroy the driver, returning the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.bus, self.delay)
    }

    /// The I²C address the driver is talking to.
    pub fn i2c_address(&self) -> u8 {
        self.address
    }

    /// The unit temperatures are currently reported in.
    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Change the unit temperatures are reported (and accepted) in.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    /// The identification number read from the sensor when the driver was created.
    pub fn id(&self) -> [u16; 4] {
        self.id
    }

    /// Read the identification number from the sensor again.
    pub fn read_id(&mut self) -> Result<[u16; 4], Error<I2C>> {
        let mut id = [0u16; 4];
        for (word, cell) in id.iter_mut().zip(EepromAddress::ID.iter()) {
            *word = self.read_eeprom(*cell)?;
        }
        self.id = id;
        Ok(id)
    }

    /// Read a raw word from the EEPROM.
    pub fn read_eeprom(&mut self, cell: EepromAddress) -> Result<u16, Error<I2C>> {
        smbus::read_word(&mut self.bus, self.address, cell.into())
    }

    /// Write a raw word to the EEPROM.
    ///
    /// The cell is erased first, and this method blocks for the erase and write times (about
    /// 10ms total).
    pub fn write_eeprom(&mut self, cell: EepromAddress, word: u16) -> Result<(), Error<I2C>> {
        write_eeprom(
            &mut self.bus,
            &mut self.delay,
            self.address,
            cell.into(),
            word,
        )
    }

    fn read_temperature(&mut self, cell: RamAddress) -> Result<f32, Error<I2C>> {
        let linear = smbus::read_word(&mut self.bus, self.address, cell.into())?;
        if linear & ERROR_FLAG != 0 {
            warn!(
                "MLX90614 ({:#04X}): {:?} has the error flag set",
                self.address, cell
            );
            Err(LibraryError::MeasurementError.into())
        } else {
            Ok(self.unit.from_linear(linear))
        }
    }

    /// Read the object temperature from the given channel.
    ///
    /// If the sensor has flagged the reading as invalid, [`LibraryError::MeasurementError`] is
    /// returned. A single zone sensor always flags channel two.
    pub fn object_temperature(&mut self, channel: Channel) -> Result<f32, Error<I2C>> {
        self.read_temperature(channel.object_temperature())
    }

    /// Read the ambient (die) temperature.
    pub fn ambient_temperature(&mut self) -> Result<f32, Error<I2C>> {
        self.read_temperature(RamAddress::AmbientTemperature)
    }

    /// Read the raw infrared data for a channel.
    pub fn raw_ir(&mut self, channel: Channel) -> Result<u16, Error<I2C>> {
        smbus::read_word(&mut self.bus, self.address, channel.raw_ir().into())
    }

    /// Read the emissivity the sensor is compensating for, between 0 and 1.
    pub fn emissivity(&mut self) -> Result<f32, Error<I2C>> {
        let raw = self.read_eeprom(EepromAddress::Emissivity)?;
        Ok(f32::from(raw) / EMISSIVITY_SCALE)
    }

    /// Set the emissivity the sensor compensates for.
    ///
    /// Values below 0.1 (and above 1) are rejected without touching the bus.
    pub fn set_emissivity(&mut self, emissivity: f32) -> Result<(), Error<I2C>> {
        if !(MIN_EMISSIVITY..=1.0).contains(&emissivity) {
            return Err(LibraryError::InvalidArgument("Emissivity must be between 0.1 and 1").into());
        }
        let raw = ((emissivity * EMISSIVITY_SCALE) as u16).max(MIN_EMISSIVITY_WORD);
        debug!(
            "MLX90614 ({:#04X}): setting emissivity to {} ({:#06X})",
            self.address, emissivity, raw
        );
        self.write_eeprom(EepromAddress::Emissivity, raw)
    }

    /// Read the SMBus address stored in the sensor's EEPROM.
    ///
    /// This can differ from [`i2c_address`][Mlx90614::i2c_address] if the address was changed
    /// and the sensor hasn't been power cycled yet.
    pub fn smbus_address(&mut self) -> Result<u8, Error<I2C>> {
        let raw = self.read_eeprom(EepromAddress::SmbusAddress)?;
        Ok((raw & 0x00FF) as u8)
    }

    /// Change the SMBus address stored in the sensor's EEPROM.
    ///
    /// The new address must be between 0x01 and 0x7F. The sensor only starts using it after a
    /// power cycle, so this driver keeps using the current address.
    pub fn set_smbus_address(&mut self, new_address: u8) -> Result<(), Error<I2C>> {
        if new_address == 0x00 || new_address >= 0x80 {
            return Err(
                LibraryError::InvalidArgument("SMBus address must be between 0x01 and 0x7F").into(),
            );
        }
        let current = self.read_eeprom(EepromAddress::SmbusAddress)?;
        // The high byte is factory data, leave it alone.
        let raw = (current & 0xFF00) | u16::from(new_address);
        debug!(
            "MLX90614 ({:#04X}): changing SMBus address to {:#04X}",
            self.address, new_address
        );
        self.write_eeprom(EepromAddress::SmbusAddress, raw)
    }

    fn range_temperature(&mut self, cell: EepromAddress) -> Result<f32, Error<I2C>> {
        let raw = self.read_eeprom(cell)?;
        Ok(self.unit.from_linear(raw))
    }

    fn set_range_temperature(&mut self, cell: EepromAddress, value: f32) -> Result<(), Error<I2C>> {
        let raw = self.unit.to_linear(value)?;
        self.write_eeprom(cell, raw)
    }

    /// The upper limit of the object temperature range.
    pub fn object_temperature_max(&mut self) -> Result<f32, Error<I2C>> {
        self.range_temperature(EepromAddress::ObjectTemperatureMax)
    }

    /// Set the upper limit of the object temperature range.
    pub fn set_object_temperature_max(&mut self, value: f32) -> Result<(), Error<I2C>> {
        self.set_range_temperature(EepromAddress::ObjectTemperatureMax, value)
    }

    /// The lower limit of the object temperature range.
    pub fn object_temperature_min(&mut self) -> Result<f32, Error<I2C>> {
        self.range_temperature(EepromAddress::ObjectTemperatureMin)
    }

    /// Set the lower limit of the object temperature range.
    pub fn set_object_temperature_min(&mut self, value: f32) -> Result<(), Error<I2C>> {
        self.set_range_temperature(EepromAddress::ObjectTemperatureMin, value)
    }

    /// The ambient temperature range as `(minimum, maximum)`.
    ///
    /// Both limits are stored as single bytes in one cell, and are converted like any other
    /// temperature.
    pub fn ambient_temperature_range(&mut self) -> Result<(f32, f32), Error<I2C>> {
        let raw = self.read_eeprom(EepromAddress::AmbientTemperatureRange)?;
        let minimum = raw & 0x00FF;
        let maximum = raw >> 8;
        Ok((self.unit.from_linear(minimum), self.unit.from_linear(maximum)))
    }

    /// Read the sensor's status flags.
    pub fn read_flags(&mut self) -> Result<ReadFlags, Error<I2C>> {
        read_register(&mut self.bus, self.address)
    }

    fn set_register<R: Register>(&mut self, register: R) -> Result<(), Error<I2C>> {
        let current = smbus::read_word(&mut self.bus, self.address, R::address())?;
        let merged = register.merge_into(current);
        if merged == current {
            Ok(())
        } else {
            write_eeprom(
                &mut self.bus,
                &mut self.delay,
                self.address,
                R::address(),
                merged,
            )
        }
    }

    /// Read the PWM control register.
    pub fn pwm_control(&mut self) -> Result<PwmControl, Error<I2C>> {
        read_register(&mut self.bus, self.address)
    }

    /// Write the PWM control register to EEPROM.
    pub fn set_pwm_control(&mut self, register: PwmControl) -> Result<(), Error<I2C>> {
        self.set_register(register)
    }

    set_register_field! {
        pwm_control,
        pwm_enabled,
        bool,
        "Enable (or disable) the PWM output."
    }

    set_register_field! {
        pwm_control,
        pwm_mode,
        PwmMode,
        "Switch between extended and single PWM modes."
    }

    set_register_field! {
        pwm_control,
        sda_push_pull,
        bool,
        "Drive SDA push-pull (or open drain)."
    }

    set_register_field! {
        pwm_control,
        thermal_relay,
        bool,
        "Use the PWM pin as a thermal relay."
    }

    /// Read configuration register 1.
    pub fn config_register(&mut self) -> Result<ConfigRegister, Error<I2C>> {
        read_register(&mut self.bus, self.address)
    }

    /// Write configuration register 1 to EEPROM.
    ///
    /// The factory calibrated bits are preserved from the current register value regardless of
    /// what `register` has for them.
    pub fn set_config_register(&mut self, register: ConfigRegister) -> Result<(), Error<I2C>> {
        self.set_register(register)
    }

    /// Get the current IIR filter setting.
    pub fn iir(&mut self) -> Result<Iir, Error<I2C>> {
        Ok(self.config_register()?.iir())
    }

    set_register_field! {
        config_register,
        iir,
        Iir,
        "Set the IIR filter."
    }

    /// Get the current FIR filter length.
    ///
    /// The datasheet advises against lengths below [128][Fir::OneTwentyEight].
    pub fn fir(&mut self) -> Result<Fir, Error<I2C>> {
        Ok(self.config_register()?.fir())
    }

    set_register_field! {
        config_register,
        fir,
        Fir,
        "Set the FIR filter length."
    }

    /// Which temperatures are used for the PWM output.
    pub fn temperature_selection(&mut self) -> Result<TemperatureSelection, Error<I2C>> {
        Ok(self.config_register()?.temperature_selection())
    }

    set_register_field! {
        config_register,
        temperature_selection,
        TemperatureSelection,
        "Select the temperatures used for the PWM output."
    }

    set_register_field! {
        config_register,
        dual_sensor,
        bool,
        "Configure the sensor as dual (or single) zone."
    }

    set_register_field! {
        config_register,
        sensor_test_disabled,
        bool,
        "Disable (or enable) the sensor test."
    }

    /// Put the sensor into sleep mode.
    ///
    /// Waking the sensor back up requires holding SCL low, which is outside of what an I²C bus
    /// implementation can do, so it's left to the application.
    pub fn sleep(&mut self) -> Result<(), Error<I2C>> {
        debug!("MLX90614 ({:#04X}): entering sleep mode", self.address);
        smbus::send_command(&mut self.bus, self.address, SpecialCommand::Sleep.into())
    }
}

fn read_register<R, I2C>(bus: &mut I2C, address: u8) -> Result<R, Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
    R: Register,
{
    let raw = smbus::read_word(bus, address, R::address())?;
    Ok(R::from(raw))
}

/// Erase an EEPROM cell, then write a new value to it.
///
/// The erase and write times always elapse before returning, even when a write fails. If the
/// erase fails the new value isn't written.
fn write_eeprom<I2C, D>(
    bus: &mut I2C,
    delay: &mut D,
    address: u8,
    command: Command,
    word: u16,
) -> Result<(), Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
    D: DelayMs<u8>,
{
    debug!(
        "MLX90614 ({:#04X}): EEPROM write {:#06X} to {:?}",
        address, word, command
    );
    let erased = smbus::write_word(bus, address, command, 0x0000);
    delay.delay_ms(T_ERASE_MS);
    erased?;
    let written = smbus::write_word(bus, address, command, word);
    delay.delay_ms(T_WRITE_MS);
    written
}
