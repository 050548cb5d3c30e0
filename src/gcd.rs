//! GCD via Lehmer's algorithm, and the extended-Euclid modular inverse.
//!
//! Lehmer's method (Knuth TAOCP vol. 2 section 4.5.2, Algorithm L) runs the
//! Euclidean inner loop on the leading two limbs' worth of bits of both
//! operands using native arithmetic, producing a 2x2 matrix (A, B, C, D)
//! that is then applied to the full-precision operands in one combined
//! multiply-subtract pass. The matrix entries never exceed `MASK`, so every
//! product fits the signed double-width accumulator. When the inner loop
//! makes no progress a single ordinary Euclidean step guarantees
//! termination.

use crate::arith;
use crate::bigint::BigInt;
use crate::digit::{bit_length_digit, Digit, DoubleDigit, MASK, SHIFT, SignedDoubleDigit};
use crate::div;
use crate::error::{Error, Result};

fn gcd_native(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        let t = x % y;
        x = y;
        y = t;
    }
    x
}

/// Greatest common divisor of the absolute values; `gcd(a, 0) == |a|`.
pub(crate) fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    if a.fits_double_digit() && b.fits_double_digit() {
        return BigInt::from_u64(gcd_native(
            a.double_digit_value().unsigned_abs() as u64,
            b.double_digit_value().unsigned_abs() as u64,
        ));
    }

    let mut a = a.abs();
    let mut b = b.abs();
    if a.cmp_value(&b) == std::cmp::Ordering::Less {
        std::mem::swap(&mut a, &mut b);
    }

    // Reduce until a fits two limbs; the invariant 0 <= b <= a holds
    // throughout.
    while a.ndigits() > 2 {
        if b.is_zero() {
            return a;
        }
        let size_a = a.ndigits();
        let size_b = b.ndigits();
        let nbits = bit_length_digit(a.digits[size_a - 1]);

        // Top 2*SHIFT bits of a, with the corresponding bits of b.
        let x = ((a.digits[size_a - 1] as DoubleDigit) << (2 * SHIFT - nbits))
            | ((a.digits[size_a - 2] as DoubleDigit) << (SHIFT - nbits))
            | (a.digits[size_a - 3] >> nbits) as DoubleDigit;
        let mut y: DoubleDigit = 0;
        if size_b >= size_a - 2 {
            y |= (b.digits[size_a - 3] >> nbits) as DoubleDigit;
        }
        if size_b >= size_a - 1 {
            y |= (b.digits[size_a - 2] as DoubleDigit) << (SHIFT - nbits);
        }
        if size_b >= size_a {
            y |= (b.digits[size_a - 1] as DoubleDigit) << (2 * SHIFT - nbits);
        }

        // Native Euclid on the leading bits, in 64-bit arithmetic so the
        // first iterations' large trial quotients cannot overflow; the
        // final A, B, C, D stay within MASK.
        let mut x = x as i64;
        let mut y = y as i64;
        let (mut ma, mut mb, mut mc, mut md): (i64, i64, i64, i64) = (1, 0, 0, 1);
        let mut k = 0u32;
        loop {
            if y == mc {
                break;
            }
            let q = (x + (ma - 1)) / (y - mc);
            let s = mb + q * md;
            let t = x - q * y;
            if s > t {
                break;
            }
            x = y;
            y = t;
            let t = ma + q * mc;
            ma = md;
            mb = mc;
            mc = s;
            md = t;
            k += 1;
        }

        if k == 0 {
            // No progress from the leading bits; fall back to one
            // full-precision Euclidean step.
            log::trace!("lehmer made no progress at {} limbs, euclid step", size_a);
            let r = div::rem_floor(&a, &b).expect("divisor checked nonzero");
            a = std::mem::replace(&mut b, r);
            continue;
        }

        //   a, b = A*b - B*a, D*a - C*b   if k is odd
        //   a, b = A*a - B*b, D*b - C*a   if k is even
        if k & 1 == 1 {
            let t = -ma;
            ma = -mb;
            mb = t;
            let t = -mc;
            mc = -md;
            md = t;
        }
        debug_assert!(ma.unsigned_abs() <= MASK as u64 && mb.unsigned_abs() <= MASK as u64);
        debug_assert!(mc.unsigned_abs() <= MASK as u64 && md.unsigned_abs() <= MASK as u64);
        let (ma, mb, mc, md) = (
            ma as SignedDoubleDigit,
            mb as SignedDoubleDigit,
            mc as SignedDoubleDigit,
            md as SignedDoubleDigit,
        );

        let mut c_digits = vec![0 as Digit; size_a];
        let mut d_digits = vec![0 as Digit; size_a];
        let mut c_carry: SignedDoubleDigit = 0;
        let mut d_carry: SignedDoubleDigit = 0;
        for i in 0..size_b {
            c_carry += ma * a.digits[i] as SignedDoubleDigit
                - mb * b.digits[i] as SignedDoubleDigit;
            d_carry += md * b.digits[i] as SignedDoubleDigit
                - mc * a.digits[i] as SignedDoubleDigit;
            c_digits[i] = (c_carry & MASK as SignedDoubleDigit) as Digit;
            d_digits[i] = (d_carry & MASK as SignedDoubleDigit) as Digit;
            c_carry >>= SHIFT;
            d_carry >>= SHIFT;
        }
        for i in size_b..size_a {
            c_carry += ma * a.digits[i] as SignedDoubleDigit;
            d_carry -= mc * a.digits[i] as SignedDoubleDigit;
            c_digits[i] = (c_carry & MASK as SignedDoubleDigit) as Digit;
            d_digits[i] = (d_carry & MASK as SignedDoubleDigit) as Digit;
            c_carry >>= SHIFT;
            d_carry >>= SHIFT;
        }
        debug_assert_eq!(c_carry, 0);
        debug_assert_eq!(d_carry, 0);

        a = BigInt::from_sign_digits(1, c_digits);
        b = BigInt::from_sign_digits(1, d_digits);
    }

    BigInt::from_u64(gcd_native(
        a.double_digit_value().unsigned_abs() as u64,
        b.double_digit_value().unsigned_abs() as u64,
    ))
}

/// Extended Euclid over repeated divmod; the result may carry either sign
/// but is smaller than `n` in absolute value. Requires `n` positive.
pub(crate) fn invmod_positive(a: &BigInt, n: &BigInt) -> Result<BigInt> {
    debug_assert!(n.is_positive());
    let mut a = a.clone();
    let mut n = n.clone();
    let mut b = BigInt::one();
    let mut c = BigInt::zero();
    while !n.is_zero() {
        let (q, r) = div::divmod(&a, &n)?;
        a = std::mem::replace(&mut n, r);
        let t = crate::mul::mul(&q, &c);
        let s = arith::sub(&b, &t);
        b = std::mem::replace(&mut c, s);
    }
    // a is now the gcd of the original inputs
    if a.is_one() {
        Ok(b)
    } else {
        Err(Error::NotInvertible)
    }
}

/// Public inverse: canonicalized into the modulus range, matching the sign
/// convention of modular exponentiation with exponent -1.
pub(crate) fn mod_inverse(a: &BigInt, n: &BigInt) -> Result<BigInt> {
    if n.is_zero() {
        return Err(Error::DivisionByZero);
    }
    let n_abs = n.abs();
    let raw = invmod_positive(a, &n_abs)?;
    let canonical = div::rem_floor(&raw, &n_abs)?;
    if n.is_negative() && !canonical.is_zero() {
        Ok(arith::sub(&canonical, &n_abs))
    } else {
        Ok(canonical)
    }
}

impl BigInt {
    /// Greatest common divisor of the absolute values; never negative, and
    /// `gcd(a, 0) == |a|`.
    pub fn gcd(&self, other: &BigInt) -> BigInt {
        gcd(self, other)
    }

    /// Multiplicative inverse modulo `n`, canonicalized into the modulus
    /// range. `NotInvertible` when the values share a factor,
    /// `DivisionByZero` for a zero modulus.
    pub fn mod_inverse(&self, n: &BigInt) -> Result<BigInt> {
        mod_inverse(self, n)
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

    fn naive_gcd(a: &BigInt, b: &BigInt) -> BigInt {
        let mut x = a.abs();
        let mut y = b.abs();
        while !y.is_zero() {
            let r = div::rem_floor(&x, &y).unwrap();
            x = std::mem::replace(&mut y, r);
        }
        x
    }

    fn random_value(rng: &mut XorShiftRng, bits: u32) -> BigInt {
        let mut v = BigInt::zero();
        let mut produced = 0;
        while produced < bits {
            let chunk = (bits - produced).min(32);
            let limb = rng.gen::<u32>() >> (32 - chunk);
            let shifted = crate::bits::checked_shl(&v, chunk as u64).unwrap();
            v = arith::add(&shifted, &BigInt::from(limb));
            produced += chunk;
        }
        v
    }

    #[test]
    fn small_examples() {
        assert_eq!(gcd(&big(270), &big(192)), big(6));
        assert_eq!(gcd(&big(0), &big(0)), big(0));
        assert_eq!(gcd(&big(-270), &big(192)), big(6));
        assert_eq!(gcd(&big(0), &big(-7)), big(7));
        assert_eq!(gcd(&big(-7), &big(0)), big(7));
    }

    #[test]
    fn lehmer_matches_naive_euclid() {
        let mut rng = XorShiftRng::from_seed([31u8; 16]);
        for i in 0..40 {
            let a = random_value(&mut rng, 64 + i * 11);
            let b = random_value(&mut rng, 32 + i * 7);
            let g = gcd(&a, &b);
            assert_eq!(g, naive_gcd(&a, &b), "gcd({:?} limbs)", a.digits().len());
            assert!(!g.is_negative());
            if !g.is_zero() {
                assert!(div::rem_floor(&a, &g).unwrap().is_zero());
                assert!(div::rem_floor(&b, &g).unwrap().is_zero());
            }
        }
    }

    #[test]
    fn shared_factor_survives() {
        let mut rng = XorShiftRng::from_seed([33u8; 16]);
        let f = random_value(&mut rng, 90);
        let a = crate::mul::mul(&f, &random_value(&mut rng, 70));
        let b = crate::mul::mul(&f, &random_value(&mut rng, 50));
        let g = gcd(&a, &b);
        assert!(div::rem_floor(&g, &f).unwrap().is_zero());
    }

    #[test]
    fn inverse_times_base_is_one() {
        let n = big(1_000_000_007);
        for v in [2i128, 3, 65537, 1 << 40] {
            let inv = mod_inverse(&big(v), &n).unwrap();
            let prod = div::rem_floor(&crate::mul::mul(&big(v), &inv), &n).unwrap();
            assert_eq!(prod, BigInt::one());
        }
    }

    #[test]
    fn non_invertible_is_an_error() {
        assert_eq!(mod_inverse(&big(6), &big(9)), Err(Error::NotInvertible));
        assert_eq!(mod_inverse(&big(5), &big(0)), Err(Error::DivisionByZero));
    }

    #[test]
    fn negative_modulus_sign_convention() {
        // inverse of 3 mod 7 is 5; with modulus -7 the result shifts into
        // the negative range.
        assert_eq!(mod_inverse(&big(3), &big(7)).unwrap(), big(5));
        assert_eq!(mod_inverse(&big(3), &big(-7)).unwrap(), big(-2));
    }
}
