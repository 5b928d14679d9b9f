// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

//! SMBus Packet Error Code
//!
//! Every word read from or written to the MLX90614 is followed by a Packet Error Code (PEC). The
//! PEC is a CRC-8 with the polynomial x<sup>8</sup> + x<sup>2</sup> + x<sup>1</sup> + 1 (`0x07`),
//! an initial value of 0, no reflection and no final XOR. It covers every byte of the transaction
//! (including the address bytes with their read/write bit) except for the PEC itself, and
//! excluding the START, repeated START, STOP, ACK and NACK conditions.
//!
//! For a read of command `0x07` from a sensor at `0x5A`, the bytes covered are:
//! ```text
//! 0xB4  0x07  0xB5  LSB  MSB
//! ^     ^     ^
//! |     |     +-- address, read
//! |     +-- command
//! +-- address, write
//! ```

/// The CRC-8 generator polynomial, with the implicit x<sup>8</sup> term dropped.
const POLYNOMIAL: u8 = 0x07;

/// Feed one byte into a running CRC-8.
pub const fn crc8_update(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut bit_index = 0;
    while bit_index < 8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ POLYNOMIAL
        } else {
            crc << 1
        };
        bit_index += 1;
    }
    crc
}

/// Compute the CRC-8 of a sequence of bytes.
pub fn pec(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |crc, byte| crc8_update(crc, *byte))
}

/// The address byte sent when writing to a device (the address shifted up, R/W bit clear).
pub const fn write_address_byte(i2c_address: u8) -> u8 {
    i2c_address << 1
}

/// The address byte sent when reading from a device (the address shifted up, R/W bit set).
pub const fn read_address_byte(i2c_address: u8) -> u8 {
    (i2c_address << 1) | 1
}

/// The PEC the sensor appends when responding to a read of `command`.
pub fn read_word_pec(i2c_address: u8, command: u8, word: [u8; 2]) -> u8 {
    pec(&[
        write_address_byte(i2c_address),
        command,
        read_address_byte(i2c_address),
        word[0],
        word[1],
    ])
}

/// The PEC the controller appends when writing `word` to `command`.
///
/// There is no repeated START in a write, so the read address byte is not included.
pub fn write_word_pec(i2c_address: u8, command: u8, word: [u8; 2]) -> u8 {
    pec(&[write_address_byte(i2c_address), command, word[0], word[1]])
}

/// The PEC for a bare command with no data (like entering sleep mode).
pub fn command_pec(i2c_address: u8, command: u8) -> u8 {
    pec(&[write_address_byte(i2c_address), command])
}
