//! Conversions between integers and IEEE doubles, all correctly rounded.
//!
//! The integer-to-double direction extracts the top `MANT_DIG + 2`
//! significant bits with a sticky low bit, applies round-half-to-even
//! through a small parity correction table, and rescales. True division of
//! two integers picks a shift so the scaled quotient carries two or three
//! extra bits, tracks inexactness through the shift and the division, and
//! rounds once at the end, so the result is the double nearest to the real
//! quotient.

use crate::arith::{v_lshift, v_rshift};
use crate::bigint::BigInt;
use crate::digit::{bit_length_digit, Digit, BASE, SHIFT, SignedDoubleDigit};
use crate::div::{divrem, inplace_divrem1};
use crate::error::{Error, Result};

const MANT_DIG: u32 = f64::MANTISSA_DIGITS; // 53
const DBL_MAX_EXP: i64 = f64::MAX_EXP as i64; // 1024
const DBL_MIN_EXP: i64 = f64::MIN_EXP as i64; // -1021
const EXP2_MANT_DIG: f64 = 9007199254740992.0; // 2**53
const INT64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2**63

/// `2**e` for exponents in the normal range.
fn pow2(e: i64) -> f64 {
    debug_assert!((-1022..=1023).contains(&e));
    f64::from_bits(((e + 1023) as u64) << 52)
}

/// `x * 2**e`. Stepwise scaling by exact powers of two; every step is
/// exact provided the final value is representable, which the callers
/// arrange by pre-rounding and pre-checking for overflow.
pub(crate) fn ldexp(mut x: f64, mut e: i64) -> f64 {
    while e > 900 {
        x *= pow2(900);
        e -= 900;
    }
    while e < -900 {
        x *= pow2(-900);
        e += 900;
    }
    x * pow2(e)
}

/// Fraction/exponent split of a positive normal double.
fn frexp_f64(x: f64) -> (f64, i64) {
    debug_assert!(x.is_finite() && x >= f64::MIN_POSITIVE);
    let bits = x.to_bits();
    let e = ((bits >> 52) & 0x7ff) as i64 - 1022;
    let frac = f64::from_bits((bits & !(0x7ffu64 << 52)) | (1022u64 << 52));
    (frac, e)
}

/// Express a nonzero value as `x * 2**e` with `0.5 <= |x| < 1.0`, `x`
/// rounded to `MANT_DIG` significant bits using round-half-to-even. Zero
/// yields `(0.0, 0)`.
pub(crate) fn frexp(a: &BigInt) -> (f64, i64) {
    // For a digit x, x + HALF_EVEN_CORRECTION[x & 7] rounds x to the
    // nearest multiple of 4, ties to a multiple of 8.
    const HALF_EVEN_CORRECTION: [i8; 8] = [0, -1, -2, 1, 0, -1, 2, 1];

    let a_size = a.ndigits();
    if a_size == 0 {
        return (0.0, 0);
    }
    let a_bits = a.bit_length() as i64;

    // Shift the top MANT_DIG + 2 bits of |a| into x_digits, shifting left
    // when the value is short. The worst case needs exactly this many
    // limbs.
    let x_len = 2 + (MANT_DIG as usize + 1) / SHIFT as usize;
    let mut x_digits = vec![0 as Digit; x_len];
    let x_size;
    if a_bits <= MANT_DIG as i64 + 2 {
        let shift_digits = ((MANT_DIG as i64 + 2 - a_bits) / SHIFT as i64) as usize;
        let shift_bits = ((MANT_DIG as i64 + 2 - a_bits) % SHIFT as i64) as u32;
        let mut sz = shift_digits;
        let rem = v_lshift(&mut x_digits[sz..sz + a_size], &a.digits, shift_bits);
        sz += a_size;
        x_digits[sz] = rem;
        x_size = sz + 1;
    } else {
        let shift = a_bits - MANT_DIG as i64 - 2;
        let shift_digits = (shift / SHIFT as i64) as usize;
        let shift_bits = (shift % SHIFT as i64) as u32;
        x_size = a_size - shift_digits;
        let rem = v_rshift(&mut x_digits[..x_size], &a.digits[shift_digits..], shift_bits);
        // The least significant bit is sticky: any bit shifted out makes
        // the rounding decision see "strictly above half".
        if rem != 0 || a.digits[..shift_digits].iter().any(|&d| d != 0) {
            x_digits[0] |= 1;
        }
    }
    debug_assert!(1 <= x_size && x_size <= x_len);

    // Round, then convert to a double; every step below is exact.
    let corr = HALF_EVEN_CORRECTION[(x_digits[0] & 7) as usize];
    x_digits[0] = (x_digits[0] as SignedDoubleDigit + corr as SignedDoubleDigit) as Digit;
    let mut dx = 0.0f64;
    for &d in x_digits[..x_size].iter().rev() {
        dx = dx * BASE as f64 + d as f64;
    }

    // Rescale, correcting for the carry-out case where rounding pushed the
    // fraction up to exactly 1.0.
    dx /= 4.0 * EXP2_MANT_DIG;
    let mut e = a_bits;
    if dx == 1.0 {
        dx = 0.5;
        e += 1;
    }
    (if a.is_negative() { -dx } else { dx }, e)
}

/// Nearest double, round-half-to-even; `Overflow` when the value exceeds
/// the double range.
pub(crate) fn to_f64(a: &BigInt) -> Result<f64> {
    if a.is_compact() {
        // single limb casts exactly
        return Ok(a.medium_value() as f64);
    }
    let (x, exponent) = frexp(a);
    if exponent > DBL_MAX_EXP {
        return Err(Error::Overflow("int too large to convert to float"));
    }
    Ok(ldexp(x, exponent))
}

/// The double when the conversion loses nothing, else `None`.
pub(crate) fn to_f64_lossless(a: &BigInt) -> Option<f64> {
    let d = to_f64(a).ok()?;
    if from_f64(d).ok()? == *a {
        Some(d)
    } else {
        None
    }
}

/// Truncate a finite double toward zero.
pub(crate) fn from_f64(dval: f64) -> Result<BigInt> {
    // Values strictly inside the i64 range truncate through the native
    // cast; NaN fails both comparisons and falls through to the check.
    if dval > -INT64_BOUND && dval < INT64_BOUND {
        return Ok(BigInt::from_i64(dval as i64));
    }
    if dval.is_infinite() {
        return Err(Error::Overflow("cannot convert float infinity to integer"));
    }
    if dval.is_nan() {
        return Err(Error::NanConversion);
    }

    let neg = dval < 0.0;
    let (mut frac, expo) = frexp_f64(dval.abs());
    debug_assert!(expo > 0);
    let ndig = ((expo - 1) / SHIFT as i64 + 1) as usize;
    let mut digits = vec![0 as Digit; ndig];
    frac = ldexp(frac, (expo - 1) % SHIFT as i64 + 1);
    for i in (0..ndig).rev() {
        let bits = frac as Digit;
        digits[i] = bits;
        frac = (frac - bits as f64) * BASE as f64;
    }
    Ok(BigInt::from_sign_digits(if neg { -1 } else { 1 }, digits))
}

/// `a / b` as a correctly rounded double.
pub(crate) fn true_divide(a: &BigInt, b: &BigInt) -> Result<f64> {
    const MANT_DIG_DIGITS: usize = (MANT_DIG / SHIFT) as usize;
    const MANT_DIG_BITS: u32 = MANT_DIG % SHIFT;
    const OVERFLOW_MSG: &str = "integer division result too large for a float";

    let a_size = a.ndigits();
    let b_size = b.ndigits();
    let negate = a.is_negative() != b.is_negative();
    if b_size == 0 {
        return Err(Error::DivisionByZero);
    }
    if a_size == 0 {
        return Ok(if negate { -0.0 } else { 0.0 });
    }

    // Both operands exactly representable: rely on correctly rounded
    // native division.
    let is_small = |v: &BigInt, size: usize| {
        size <= MANT_DIG_DIGITS
            || (size == MANT_DIG_DIGITS + 1 && v.digits[MANT_DIG_DIGITS] >> MANT_DIG_BITS == 0)
    };
    if is_small(a, a_size) && is_small(b, b_size) {
        let fold = |v: &BigInt| {
            v.digits
                .iter()
                .rev()
                .fold(0.0f64, |acc, &d| acc * BASE as f64 + d as f64)
        };
        let result = fold(a) / fold(b);
        return Ok(if negate { -result } else { result });
    }

    let diff = (a_size as i64 - b_size as i64) * SHIFT as i64
        + bit_length_digit(a.digits[a_size - 1]) as i64
        - bit_length_digit(b.digits[b_size - 1]) as i64;
    if diff > DBL_MAX_EXP {
        return Err(Error::Overflow(OVERFLOW_MSG));
    }
    if diff < DBL_MIN_EXP - MANT_DIG as i64 - 1 {
        return Ok(if negate { -0.0 } else { 0.0 });
    }

    // Scale so the quotient keeps 2 or 3 extra bits for rounding; the max
    // with DBL_MIN_EXP avoids double rounding in the subnormal range.
    let shift = diff.max(DBL_MIN_EXP) - MANT_DIG as i64 - 2;
    let mut inexact = false;

    // x = |a| * 2**-shift
    let mut x: BigInt;
    if shift <= 0 {
        let shift_digits = ((-shift) / SHIFT as i64) as usize;
        let shift_bits = ((-shift) % SHIFT as i64) as u32;
        let mut xd = vec![0 as Digit; a_size + shift_digits + 1];
        let rem = v_lshift(&mut xd[shift_digits..shift_digits + a_size], &a.digits, shift_bits);
        xd[a_size + shift_digits] = rem;
        x = BigInt::from_sign_digits(1, xd);
    } else {
        let shift_digits = (shift / SHIFT as i64) as usize;
        let shift_bits = (shift % SHIFT as i64) as u32;
        debug_assert!(shift_digits < a_size);
        let mut xd = vec![0 as Digit; a_size - shift_digits];
        let rem = v_rshift(&mut xd, &a.digits[shift_digits..], shift_bits);
        if rem != 0 || a.digits[..shift_digits].iter().any(|&d| d != 0) {
            inexact = true;
        }
        x = BigInt::from_sign_digits(1, xd);
    }

    // x //= |b|
    if b_size == 1 {
        let mut out = vec![0 as Digit; x.ndigits()];
        let rem = inplace_divrem1(&mut out, &x.digits, b.digits[0]);
        if rem != 0 {
            inexact = true;
        }
        x = BigInt::from_sign_digits(1, out);
    } else {
        let (q, r) = divrem(&x, &b.abs())?;
        if !r.is_zero() {
            inexact = true;
        }
        x = q;
    }
    let x_bits = x.bit_length() as i64;
    debug_assert!(x_bits > 0);

    // Round away the extra bits directly in the low limb; the bumped limb
    // may exceed the digit mask, which the storage type tolerates and the
    // exact double accumulation below absorbs.
    let extra_bits = x_bits.max(DBL_MIN_EXP - shift) - MANT_DIG as i64;
    debug_assert!(extra_bits == 2 || extra_bits == 3);
    let mut xd = x.digits;
    let mask: Digit = (1 as Digit) << (extra_bits - 1) as u32;
    let mut low = xd[0] | inexact as Digit;
    if (low & mask) != 0 && (low & (3 * mask - 1)) != 0 {
        low += mask;
    }
    xd[0] = low & !(2 * mask - 1);

    let mut dx = 0.0f64;
    for &d in xd.iter().rev() {
        dx = dx * BASE as f64 + d as f64;
    }

    if shift + x_bits >= DBL_MAX_EXP
        && (shift + x_bits > DBL_MAX_EXP || dx == ldexp(1.0, x_bits))
    {
        return Err(Error::Overflow(OVERFLOW_MSG));
    }
    let result = ldexp(dx, shift);
    Ok(if negate { -result } else { result })
}

impl BigInt {
    /// Nearest double, round-half-to-even; `Overflow` beyond the double
    /// range.
    pub fn to_f64(&self) -> Result<f64> {
        to_f64(self)
    }

    /// The double when the conversion is exact, else `None`.
    pub fn to_f64_lossless(&self) -> Option<f64> {
        to_f64_lossless(self)
    }

    /// Truncate a finite double toward zero; `Overflow` for infinities and
    /// `NanConversion` for NaN.
    pub fn from_f64(value: f64) -> Result<BigInt> {
        from_f64(value)
    }

    /// `self / other` as a correctly rounded double.
    pub fn true_div(&self, other: &BigInt) -> Result<f64> {
        true_divide(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i128) -> BigInt {
        BigInt::from_i128(v)
    }

    fn pow10(n: u64) -> BigInt {
        crate::pow::pow_mod(&big(10), &BigInt::from(n), None).unwrap()
    }

    #[test]
    fn small_values_are_exact() {
        for v in [0i64, 1, -1, 42, -9007199254740992, 9007199254740992] {
            assert_eq!(to_f64(&BigInt::from(v)).unwrap(), v as f64);
        }
    }

    #[test]
    fn rounding_is_half_to_even() {
        let base = 1i128 << 53;
        assert_eq!(to_f64(&big(base + 1)).unwrap(), base as f64);
        assert_eq!(to_f64(&big(base + 2)).unwrap(), (base + 2) as f64);
        assert_eq!(to_f64(&big(base + 3)).unwrap(), (base + 4) as f64);
        assert_eq!(to_f64(&big(-(base + 3))).unwrap(), -((base + 4) as f64));
        // scaled far beyond the mantissa width the same rule applies
        let wide = crate::bits::checked_shl(&big(base + 3), 600).unwrap();
        let expect = ldexp((base + 4) as f64, 600);
        assert_eq!(to_f64(&wide).unwrap(), expect);
    }

    #[test]
    fn overflow_at_the_double_boundary() {
        assert!(matches!(to_f64(&pow10(400)), Err(Error::Overflow(_))));
        // largest finite double round-trips
        let max = from_f64(f64::MAX).unwrap();
        assert_eq!(to_f64(&max).unwrap(), f64::MAX);
        // halfway between MAX and 2**1024 rounds up, which overflows
        let two_970 = crate::bits::checked_shl(&big(1), 970).unwrap();
        let boundary = crate::arith::add(&max, &two_970);
        assert!(matches!(to_f64(&boundary), Err(Error::Overflow(_))));
        // just below halfway rounds back down to MAX
        let below = crate::arith::sub(&boundary, &big(1));
        assert_eq!(to_f64(&below).unwrap(), f64::MAX);
    }

    #[test]
    fn from_double_truncates_toward_zero() {
        assert_eq!(from_f64(2.9).unwrap(), big(2));
        assert_eq!(from_f64(-2.9).unwrap(), big(-2));
        assert_eq!(from_f64(0.0).unwrap(), big(0));
        assert_eq!(from_f64(-0.75).unwrap(), big(0));
        assert_eq!(from_f64(1e300).map(|v| to_f64(&v).unwrap()), Ok(1e300));
        assert!(matches!(from_f64(f64::INFINITY), Err(Error::Overflow(_))));
        assert!(matches!(from_f64(f64::NEG_INFINITY), Err(Error::Overflow(_))));
        assert_eq!(from_f64(f64::NAN), Err(Error::NanConversion));
    }

    #[test]
    fn float_int_round_trip() {
        for e in [60i64, 100, 500, 1023] {
            let d = ldexp(1.5, e);
            let back = to_f64(&from_f64(d).unwrap()).unwrap();
            assert_eq!(back, d, "2**{}", e);
        }
    }

    #[test]
    fn lossless_check() {
        assert_eq!(to_f64_lossless(&big(1 << 52)), Some((1i64 << 52) as f64));
        assert_eq!(to_f64_lossless(&big((1 << 53) + 1)), None);
        assert!(to_f64_lossless(&pow10(400)).is_none());
    }

    #[test]
    fn true_division_basics() {
        assert_eq!(true_divide(&big(1), &big(2)).unwrap(), 0.5);
        assert_eq!(true_divide(&big(-1), &big(2)).unwrap(), -0.5);
        assert_eq!(true_divide(&big(1), &big(3)).unwrap(), 1.0 / 3.0);
        assert_eq!(true_divide(&big(0), &big(5)).unwrap(), 0.0);
        assert!(true_divide(&big(0), &big(-5)).unwrap().is_sign_negative());
        assert_eq!(true_divide(&big(1), &big(0)), Err(Error::DivisionByZero));
    }

    #[test]
    fn true_division_wide_operands() {
        // quotient of exactly representable magnitude
        assert_eq!(true_divide(&pow10(40), &pow10(20)).unwrap(), 1e20);
        // scaling numerator and denominator together changes nothing
        let a = big(987654321987654321);
        let b = big(123456789123456789);
        let plain = true_divide(&a, &b).unwrap();
        let shifted = true_divide(
            &crate::bits::checked_shl(&a, 300).unwrap(),
            &crate::bits::checked_shl(&b, 300).unwrap(),
        )
        .unwrap();
        assert_eq!(plain, shifted);
        // dividing by one reduces to the rounded conversion
        let x = crate::arith::add(&crate::bits::checked_shl(&big(1), 200).unwrap(), &big(1));
        assert_eq!(true_divide(&x, &big(1)).unwrap(), to_f64(&x).unwrap());
    }

    #[test]
    fn true_division_extremes() {
        assert!(matches!(
            true_divide(&pow10(400), &big(1)),
            Err(Error::Overflow(_))
        ));
        assert_eq!(true_divide(&big(1), &pow10(400)).unwrap(), 0.0);
        assert!(true_divide(&big(-1), &pow10(400)).unwrap().is_sign_negative());
    }
}
