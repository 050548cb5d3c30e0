//! Fixed-width byte-buffer import and export.
//!
//! Signed buffers are two's complement; the conversion negates on the fly
//! while packing 8-bit bytes into limbs (and back), so no intermediate
//! magnitude copy is needed. Export writes exactly the requested width and
//! reports `Overflow` when the value does not fit, including the positive
//! value whose top bit would be mistaken for a sign.

use crate::bigint::BigInt;
use crate::digit::{Digit, DoubleDigit, MASK, SHIFT};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Interpret `bytes` as a fixed-width integer.
pub(crate) fn from_bytes(bytes: &[u8], endian: Endian, signed: bool) -> BigInt {
    let n = bytes.len();
    if n == 0 {
        return BigInt::zero();
    }
    let at = |i: usize| match endian {
        Endian::Little => bytes[i],
        Endian::Big => bytes[n - 1 - i],
    };
    let neg = signed && at(n - 1) >= 0x80;

    // Leading 0x00 bytes are insignificant for positive values, leading
    // 0xff bytes for negative ones; keep one extra byte in the negative
    // case so patterns like 0xff00 (== -0x0100) keep both bytes.
    let insignificant = if neg { 0xff } else { 0x00 };
    let mut nsig = n;
    while nsig > 0 && at(nsig - 1) == insignificant {
        nsig -= 1;
    }
    if neg && nsig < n {
        nsig += 1;
    }

    let mut digits: Vec<Digit> = Vec::with_capacity(nsig * 8 / SHIFT as usize + 1);
    let mut carry: DoubleDigit = 1;
    let mut accum: DoubleDigit = 0;
    let mut accumbits: u32 = 0;
    for i in 0..nsig {
        let mut thisbyte = at(i) as DoubleDigit;
        if neg {
            thisbyte = (0xff ^ thisbyte) + carry;
            carry = thisbyte >> 8;
            thisbyte &= 0xff;
        }
        accum |= thisbyte << accumbits;
        accumbits += 8;
        if accumbits >= SHIFT {
            digits.push(accum as Digit & MASK);
            accum >>= SHIFT;
            accumbits -= SHIFT;
        }
    }
    if accumbits != 0 {
        digits.push(accum as Digit);
    }
    BigInt::from_sign_digits(if neg { -1 } else { 1 }, digits)
}

/// Export as exactly `len` bytes, sign-extended when `signed`.
pub(crate) fn to_bytes(v: &BigInt, len: usize, endian: Endian, signed: bool) -> Result<Vec<u8>> {
    const TOO_BIG: &str = "int too big to convert";
    let do_twos_comp = v.is_negative();
    if do_twos_comp && !signed {
        return Err(Error::Overflow("can't convert negative int to unsigned"));
    }

    // Fill least-significant-first, flip at the end for big-endian.
    let mut out = vec![0u8; len];
    let mut j = 0usize;
    let mut accum: DoubleDigit = 0;
    let mut accumbits: u32 = 0;
    let mut carry: Digit = if do_twos_comp { 1 } else { 0 };
    let ndigits = v.ndigits();
    for i in 0..ndigits {
        let mut thisdigit = v.digits[i];
        if do_twos_comp {
            thisdigit = (thisdigit ^ MASK) + carry;
            carry = thisdigit >> SHIFT;
            thisdigit &= MASK;
        }
        accum |= (thisdigit as DoubleDigit) << accumbits;

        if i == ndigits - 1 {
            // The most significant limb contributes only its significant
            // bits; sign bits need not be stored.
            let mut s = if do_twos_comp { thisdigit ^ MASK } else { thisdigit };
            while s != 0 {
                s >>= 1;
                accumbits += 1;
            }
        } else {
            accumbits += SHIFT;
        }

        while accumbits >= 8 {
            if j >= len {
                return Err(Error::Overflow(TOO_BIG));
            }
            out[j] = (accum & 0xff) as u8;
            j += 1;
            accumbits -= 8;
            accum >>= 8;
        }
    }

    debug_assert!(accumbits < 8);
    debug_assert_eq!(carry, 0);
    if accumbits > 0 {
        if j >= len {
            return Err(Error::Overflow(TOO_BIG));
        }
        if do_twos_comp {
            // pretend the int had an infinite supply of sign bits
            accum |= !0 << accumbits;
        }
        out[j] = (accum & 0xff) as u8;
        j += 1;
    } else if j == len && len > 0 && signed {
        // The digits filled the buffer exactly, so no loop got the chance
        // to store a sign bit; make sure one exists.
        let sign_bit_set = out[j - 1] >= 0x80;
        if sign_bit_set != do_twos_comp {
            return Err(Error::Overflow(TOO_BIG));
        }
    }

    let signbyte = if do_twos_comp { 0xffu8 } else { 0 };
    for slot in &mut out[j..] {
        *slot = signbyte;
    }
    if endian == Endian::Big {
        out.reverse();
    }
    Ok(out)
}

/// Minimal export width in bytes. A positive value whose top bit is set
/// needs one more byte under `signed` than unsigned; `-(2**k)` fits its
/// unsigned width exactly.
pub(crate) fn bytes_needed(v: &BigInt, signed: bool) -> usize {
    let nbits = v.bit_length();
    let needed = if v.is_negative() {
        if v.count_ones() == 1 {
            nbits
        } else {
            nbits + 1
        }
    } else if signed {
        nbits + 1
    } else {
        nbits
    };
    ((needed + 7) / 8) as usize
}

impl BigInt {
    /// Interpret a fixed-width buffer as an integer; `signed` selects
    /// two's-complement decoding of the top bit.
    pub fn from_bytes(bytes: &[u8], endian: Endian, signed: bool) -> BigInt {
        from_bytes(bytes, endian, signed)
    }

    /// Export as exactly `len` bytes, sign-extending; `Overflow` when the
    /// value does not fit the requested width.
    pub fn to_bytes(&self, len: usize, endian: Endian, signed: bool) -> Result<Vec<u8>> {
        to_bytes(self, len, endian, signed)
    }

    /// Minimal width `to_bytes` would accept, without writing anything.
    pub fn bytes_needed(&self, signed: bool) -> usize {
        bytes_needed(self, signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn big(v: i128) -> BigInt {
        BigInt::from_i128(v)
    }

    #[test]
    fn minus_one_is_all_ones() {
        assert_eq!(
            to_bytes(&big(-1), 2, Endian::Big, true).unwrap(),
            vec![0xff, 0xff]
        );
        assert_eq!(from_bytes(&[0xff, 0xff], Endian::Big, true), big(-1));
        assert_eq!(from_bytes(&[0xff, 0xff], Endian::Big, false), big(0xffff));
    }

    #[test]
    fn round_trip_native_values() {
        let mut rng = XorShiftRng::from_seed([61u8; 16]);
        for _ in 0..200 {
            let v = rng.gen::<i64>() >> rng.gen_range(0..56);
            let x = big(v as i128);
            for endian in [Endian::Big, Endian::Little] {
                let buf = to_bytes(&x, 9, endian, true).unwrap();
                assert_eq!(from_bytes(&buf, endian, true), x, "{} {:?}", v, endian);
            }
            let le = to_bytes(&x, 8, Endian::Little, true).unwrap();
            assert_eq!(le, v.to_le_bytes(), "{}", v);
        }
    }

    #[test]
    fn unsigned_round_trip_wide() {
        let mut rng = XorShiftRng::from_seed([63u8; 16]);
        for _ in 0..50 {
            let mut v = BigInt::zero();
            for _ in 0..rng.gen_range(1..8) {
                let shifted = crate::bits::checked_shl(&v, 32).unwrap();
                v = crate::arith::add(&shifted, &BigInt::from(rng.gen::<u32>()));
            }
            let width = bytes_needed(&v, false).max(1);
            let buf = to_bytes(&v, width, Endian::Big, false).unwrap();
            assert_eq!(from_bytes(&buf, Endian::Big, false), v);
        }
    }

    #[test]
    fn export_overflow_reporting() {
        // 255 fits one unsigned byte but needs two signed
        assert!(to_bytes(&big(255), 1, Endian::Big, false).is_ok());
        assert!(matches!(
            to_bytes(&big(255), 1, Endian::Big, true),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            to_bytes(&big(256), 1, Endian::Big, false),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            to_bytes(&big(-1), 2, Endian::Big, false),
            Err(Error::Overflow(_))
        ));
        // signed boundaries
        assert!(to_bytes(&big(127), 1, Endian::Big, true).is_ok());
        assert!(to_bytes(&big(-128), 1, Endian::Big, true).is_ok());
        assert!(matches!(
            to_bytes(&big(-129), 1, Endian::Big, true),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn probe_reports_minimal_width() {
        assert_eq!(bytes_needed(&big(0), false), 0);
        assert_eq!(bytes_needed(&big(255), false), 1);
        assert_eq!(bytes_needed(&big(255), true), 2);
        assert_eq!(bytes_needed(&big(127), true), 1);
        assert_eq!(bytes_needed(&big(-128), true), 1);
        assert_eq!(bytes_needed(&big(-129), true), 2);
        assert_eq!(bytes_needed(&big(65536), false), 3);
    }

    #[test]
    fn sign_extension_fills_the_request() {
        assert_eq!(
            to_bytes(&big(-2), 4, Endian::Little, true).unwrap(),
            vec![0xfe, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            to_bytes(&big(2), 4, Endian::Big, true).unwrap(),
            vec![0, 0, 0, 2]
        );
    }

    #[test]
    fn insignificant_leading_bytes_are_trimmed() {
        assert_eq!(from_bytes(&[1, 0, 0], Endian::Little, false), big(1));
        assert_eq!(from_bytes(&[0, 0, 1], Endian::Little, false), big(1 << 16));
        assert_eq!(from_bytes(&[], Endian::Big, true), big(0));
        // 0xff00 keeps two significant bytes under signed interpretation
        assert_eq!(from_bytes(&[0xff, 0x00], Endian::Big, true), big(-256));
    }
}
