// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Memory map of the MLX90614.
//!
//! The sensor is accessed over SMBus, where every transaction starts with an 8-bit command code.
//! The top three bits of the command select the kind of access (`000x_xxxx` for RAM, `001x_xxxx`
//! for EEPROM, and a couple of special commands above that) and the remaining bits select the
//! cell. Every cell holds one 16-bit word, sent least significant byte first.
use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The factory default SMBus address of every MLX90614.
pub const DEFAULT_ADDRESS: u8 = 0x5A;

/// Marker newtype for SMBus command codes.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Command(u8);

impl Command {
    /// Wrap the given command code in a `Command`.
    ///
    /// This function is intended to be used in const contexts, in other cases the `From`
    /// implementations are probably easier to use.
    pub const fn new(command: u8) -> Self {
        Self(command)
    }

    pub(crate) fn as_byte(&self) -> u8 {
        self.0
    }

    /// Whether this command accesses the EEPROM.
    pub fn is_eeprom(&self) -> bool {
        self.0 & 0xE0 == 0x20
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({:#04X})", self.0)
    }
}

impl From<u8> for Command {
    fn from(raw_command: u8) -> Self {
        Self::new(raw_command)
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.0
    }
}

/// Cells in the sensor's RAM. These are read-only from the controller's side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RamAddress {
    /// Raw data from IR channel 1.
    RawIr1 = 0x04,

    /// Raw data from IR channel 2 (only populated on dual zone sensors).
    RawIr2 = 0x05,

    /// Linearized ambient temperature (T<sub>a</sub>).
    AmbientTemperature = 0x06,

    /// Linearized object temperature from channel 1 (T<sub>obj1</sub>).
    ObjectTemperature1 = 0x07,

    /// Linearized object temperature from channel 2 (T<sub>obj2</sub>).
    ObjectTemperature2 = 0x08,
}

/// Cells in the sensor's EEPROM.
///
/// A write of `0x0000` must be done prior to writing a new value in order to erase the cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EepromAddress {
    /// Upper limit of the object temperature range (T<sub>o</sub><sub>max</sub>).
    ObjectTemperatureMax = 0x20,

    /// Lower limit of the object temperature range (T<sub>o</sub><sub>min</sub>).
    ObjectTemperatureMin = 0x21,

    PwmControl = 0x22,

    /// Ambient temperature range, minimum in the low byte and maximum in the high byte.
    AmbientTemperatureRange = 0x23,

    /// Emissivity correction coefficient.
    Emissivity = 0x24,

    ConfigRegister1 = 0x25,

    /// SMBus address. Only the low byte is the address, the high byte is factory data.
    SmbusAddress = 0x2E,

    Id1 = 0x3C,

    Id2 = 0x3D,

    Id3 = 0x3E,

    Id4 = 0x3F,
}

impl EepromAddress {
    /// The four identification number words, in order.
    pub const ID: [EepromAddress; 4] = [Self::Id1, Self::Id2, Self::Id3, Self::Id4];
}

/// Commands that don't address a memory cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SpecialCommand {
    /// Read the [flags register][crate::ReadFlags].
    ReadFlags = 0xF0,

    /// Enter sleep mode.
    Sleep = 0xFF,
}

macro_rules! command_from {
    ($($typ:ident),+) => {
        $(
            impl From<$typ> for Command {
                fn from(address: $typ) -> Self {
                    Self::new(address.into())
                }
            }
        )+
    };
}

command_from!(RamAddress, EepromAddress, SpecialCommand);

/// Select one of the two infrared channels.
///
/// Single zone sensors only have channel one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(usize)]
pub enum Channel {
    One = 1,
    Two = 2,
}

impl Channel {
    pub(crate) fn object_temperature(self) -> RamAddress {
        match self {
            Channel::One => RamAddress::ObjectTemperature1,
            Channel::Two => RamAddress::ObjectTemperature2,
        }
    }

    pub(crate) fn raw_ir(self) -> RamAddress {
        match self {
            Channel::One => RamAddress::RawIr1,
            Channel::Two => RamAddress::RawIr2,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eeprom_commands() {
        assert!(Command::from(EepromAddress::Emissivity).is_eeprom());
        assert!(Command::from(EepromAddress::Id4).is_eeprom());
        assert!(!Command::from(RamAddress::ObjectTemperature1).is_eeprom());
        assert!(!Command::from(SpecialCommand::ReadFlags).is_eeprom());
    }

    #[test]
    fn channel_addresses() {
        assert_eq!(Channel::One.object_temperature(), RamAddress::ObjectTemperature1);
        assert_eq!(Channel::Two.object_temperature(), RamAddress::ObjectTemperature2);
        assert_eq!(Channel::Two.raw_ir(), RamAddress::RawIr2);
    }

    #[test]
    fn command_debug() {
        extern crate std;
        use std::format;
        assert_eq!(format!("{:?}", Command::from(0x07u8)), "Command(0x07)");
    }
}
