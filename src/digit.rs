//! Limb ("digit") configuration.
//!
//! A digit stores `SHIFT` bits of magnitude in a wider unsigned type so that
//! carries and borrows can be detected without overflow. The double-width
//! accumulator holds the product of any two digits plus a digit of carry.

cfg_if::cfg_if! {
    if #[cfg(feature = "digit-15")] {
        pub type Digit = u16;
        pub type DoubleDigit = u32;
        pub type SignedDoubleDigit = i32;

        pub const SHIFT: u32 = 15;
        /// Decimal digits that fit in one limb-sized chunk when converting
        /// to and from base 10.
        pub const DECIMAL_SHIFT: u32 = 4;
        pub const DECIMAL_BASE: Digit = 10_000;
    } else {
        pub type Digit = u32;
        pub type DoubleDigit = u64;
        pub type SignedDoubleDigit = i64;

        pub const SHIFT: u32 = 30;
        pub const DECIMAL_SHIFT: u32 = 9;
        pub const DECIMAL_BASE: Digit = 1_000_000_000;
    }
}

pub const BASE: DoubleDigit = 1 << SHIFT;
pub const MASK: Digit = (BASE - 1) as Digit;

/// Ceiling on the digit count of any value, chosen so that bit lengths
/// always fit in an `i64`.
pub const MAX_DIGITS: u64 = i64::MAX as u64 / SHIFT as u64;

#[inline]
pub fn bit_length_digit(d: Digit) -> u32 {
    Digit::BITS - d.leading_zeros()
}

#[inline]
pub const fn join(hi: Digit, lo: Digit) -> DoubleDigit {
    ((hi as DoubleDigit) << SHIFT) | lo as DoubleDigit
}
