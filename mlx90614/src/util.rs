// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}

/// Extract a `width`-bit wide field starting at bit `shift`.
pub(crate) fn field(value: u16, shift: u32, width: u32) -> u16 {
    (value >> shift) & mask(width)
}

/// A mask of the lowest `width` bits.
pub(crate) const fn mask(width: u32) -> u16 {
    ((1u32 << width) - 1) as u16
}

/// Split a word into the (little-endian) byte order used on the wire.
pub(crate) fn word_to_bytes(word: u16) -> [u8; 2] {
    word.to_le_bytes()
}

pub(crate) fn bytes_to_word(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bit_set() {
        assert!(is_bit_set(0x8000u16, 15));
        assert!(!is_bit_set(0x7FFFu16, 15));
        assert!(is_bit_set(0x01u8, 0));
    }

    #[test]
    fn fields() {
        assert_eq!(field(0xFE00, 9, 7), 0x7F);
        assert_eq!(field(0x01F0, 4, 5), 0x1F);
        assert_eq!(field(0x9FB4, 0, 3), 0x4);
        assert_eq!(mask(16), 0xFFFF);
        assert_eq!(mask(1), 0x0001);
    }

    #[test]
    fn little_endian_words() {
        assert_eq!(word_to_bytes(0x27AD), [0xAD, 0x27]);
        assert_eq!(bytes_to_word([0xAD, 0x27]), 0x27AD);
    }
}
