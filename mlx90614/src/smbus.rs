// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Word-level SMBus transactions with Packet Error Code handling.
//!
//! These are the building blocks for [`Mlx90614`][crate::Mlx90614], exposed for those cases where
//! direct register access is needed. Nothing here knows about the EEPROM erase cycle; writing
//! EEPROM cells with [`write_word`] alone will not work unless the cell was erased first.
use embedded_hal::blocking::i2c;
use log::{debug, trace, warn};

use crate::address::Command;
use crate::error::{Error, LibraryError};
use crate::pec;
use crate::util::{bytes_to_word, word_to_bytes};

/// Read a word from the sensor, verifying the PEC.
///
/// This is a single combined write-read transaction: the command byte is written, then the word
/// (least significant byte first) and the PEC are read back. If the PEC doesn't match, a
/// [`LibraryError::ChecksumMismatch`] is returned and the word is discarded.
pub fn read_word<I2C>(bus: &mut I2C, i2c_address: u8, command: Command) -> Result<u16, Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    // LSB, MSB, PEC
    let mut response = [0u8; 3];
    bus.write_read(i2c_address, &[command.as_byte()], &mut response)
        .map_err(|err| {
            debug!(
                "MLX90614 ({:#04X}): write-read of {:?} failed",
                i2c_address, command
            );
            Error::I2cWriteReadError(err)
        })?;
    trace!(
        "MLX90614 ({:#04X}): READ {:?} {:02X?}",
        i2c_address,
        command,
        response
    );
    let word_bytes = [response[0], response[1]];
    let computed = pec::read_word_pec(i2c_address, command.as_byte(), word_bytes);
    let received = response[2];
    if computed == received {
        Ok(bytes_to_word(word_bytes))
    } else {
        warn!(
            "MLX90614 ({:#04X}): PEC mismatch reading {:?} (computed {:#04X}, received {:#04X})",
            i2c_address, command, computed, received
        );
        Err(LibraryError::ChecksumMismatch { computed, received }.into())
    }
}

/// Write a word to the sensor, with a PEC appended.
///
/// The sensor does not send anything back, so a successful return only means the bus transaction
/// completed.
pub fn write_word<I2C>(
    bus: &mut I2C,
    i2c_address: u8,
    command: Command,
    word: u16,
) -> Result<(), Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    let word_bytes = word_to_bytes(word);
    let combined: [u8; 4] = [
        command.as_byte(),
        word_bytes[0],
        word_bytes[1],
        pec::write_word_pec(i2c_address, command.as_byte(), word_bytes),
    ];
    trace!(
        "MLX90614 ({:#04X}): WRITE {:02X?}",
        i2c_address,
        combined
    );
    bus.write(i2c_address, &combined).map_err(|err| {
        debug!(
            "MLX90614 ({:#04X}): writing {:#06X} to {:?} failed",
            i2c_address, word, command
        );
        Error::I2cWriteError(err)
    })
}

/// Send a bare command (with its PEC) to the sensor.
pub fn send_command<I2C>(bus: &mut I2C, i2c_address: u8, command: Command) -> Result<(), Error<I2C>>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    let combined = [
        command.as_byte(),
        pec::command_pec(i2c_address, command.as_byte()),
    ];
    trace!(
        "MLX90614 ({:#04X}): COMMAND {:02X?}",
        i2c_address,
        combined
    );
    bus.write(i2c_address, &combined)
        .map_err(Error::I2cWriteError)
}

#[cfg(test)]
mod test {
    use crate::address::{EepromAddress, RamAddress, SpecialCommand};
    use crate::error::{Error, LibraryError};
    use crate::test::*;

    #[test]
    fn read_word() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        let word = super::read_word(
            &mut mock_bus,
            address,
            RamAddress::ObjectTemperature1.into(),
        )
        .unwrap();
        assert_eq!(word, 0x3593);
        let ops = mock_bus.recent_operations();
        assert_eq!(
            ops.len(),
            1,
            "Only one operation should be performed to read a word"
        );
        assert_eq!(ops[0], Operation::Read { command: 0x07 });
    }

    #[test]
    fn read_word_non_default_address() {
        // Specifically using a non-default address to make sure the PEC covers the real address.
        let address = 0x33;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        let word = super::read_word(&mut mock_bus, address, EepromAddress::Id1.into()).unwrap();
        assert_eq!(word, 0x2A4B);
    }

    #[test]
    fn corrupted_pec() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        mock_bus.set_corrupt_pec(true);
        for command in [0x04u8, 0x06, 0x07, 0x24, 0x3C].iter() {
            let result = super::read_word(&mut mock_bus, address, (*command).into());
            assert!(
                matches!(
                    result,
                    Err(Error::LibraryError(LibraryError::ChecksumMismatch { .. }))
                ),
                "Reading {:#04X} with a bad PEC should fail",
                command
            );
        }
    }

    #[test]
    fn corrupted_pec_any_value() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        mock_bus.set_corrupt_pec(true);
        for value in [0x0000u16, 0x0001, 0x3593, 0x7FFF, 0x8000, 0xFFFF].iter() {
            mock_bus.set_word(0x07, *value);
            let result = super::read_word(&mut mock_bus, address, RamAddress::ObjectTemperature1.into());
            assert!(result.is_err());
        }
    }

    #[test]
    fn read_bus_error() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        mock_bus.set_nack_reads(true);
        let result = super::read_word(&mut mock_bus, address, RamAddress::AmbientTemperature.into());
        match result {
            Err(Error::I2cWriteReadError(MockError::Nack)) => {}
            other => panic!("Expected a NACK, got {:?}", other),
        }
    }

    #[test]
    fn write_word() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        // The mock checks the PEC, so this failing means the PEC is wrong.
        super::write_word(&mut mock_bus, address, EepromAddress::Emissivity.into(), 0x0000)
            .unwrap();
        assert_eq!(mock_bus.word(0x24), 0x0000);
        super::write_word(&mut mock_bus, address, EepromAddress::Emissivity.into(), 0x7FFF)
            .unwrap();
        assert_eq!(mock_bus.word(0x24), 0x7FFF);
        assert_eq!(
            mock_bus.recent_operations().back(),
            Some(&Operation::Write {
                command: 0x24,
                word: 0x7FFF
            })
        );
    }

    #[test]
    fn write_bus_error() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        mock_bus.fail_writes_after(Some(0));
        let result =
            super::write_word(&mut mock_bus, address, EepromAddress::Emissivity.into(), 0);
        assert!(matches!(result, Err(Error::I2cWriteError(MockError::Nack))));
    }

    #[test]
    fn sleep_command() {
        let address = 0x5A;
        let (mut mock_bus, _) = mock_mlx90614_at_address(address);
        super::send_command(&mut mock_bus, address, SpecialCommand::Sleep.into()).unwrap();
        assert!(mock_bus.is_asleep());
    }
}
