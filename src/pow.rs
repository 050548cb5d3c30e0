//! Integer and modular exponentiation.
//!
//! Strategy is picked from the exponent size: tiny single-digit exponents
//! (<= 3) are unrolled, exponents up to `HUGE_EXP_CUTOFF` bits use
//! left-to-right binary square-and-multiply (HAC 14.79), and anything larger
//! uses left-to-right k-ary sliding-window exponentiation (HAC 14.85) with a
//! precomputed table of odd powers. With a modulus present every
//! intermediate product is reduced immediately, keeping operand sizes
//! bounded; without one, intermediates grow freely.

use crate::arith;
use crate::bigint::BigInt;
use crate::digit::{Digit, SHIFT};
use crate::div;
use crate::error::{Error, Result};
use crate::gcd;
use crate::mul;

const EXP_WINDOW_SIZE: u32 = 5;
const EXP_TABLE_LEN: usize = 1 << (EXP_WINDOW_SIZE - 1);
/// Exponents with no more bits than this take the plain binary ladder.
const HUGE_EXP_CUTOFF: u32 = 60;

/// `x*y`, reduced when a modulus is present.
fn mult(x: &BigInt, y: &BigInt, c: Option<&BigInt>) -> Result<BigInt> {
    let t = mul::mul(x, y);
    match c {
        Some(m) => div::rem_floor(&t, m),
        None => Ok(t),
    }
}

/// Absorb the pending window bits: square once per bit consumed, multiply
/// by the right odd-power table entry, then re-square for the trailing
/// zeros that were skipped.
fn absorb_pending(
    z: &mut BigInt,
    table: &[BigInt],
    pending: &mut u32,
    blen: &mut u32,
    c: Option<&BigInt>,
) -> Result<()> {
    debug_assert!(*pending != 0 && *blen != 0);
    debug_assert!(*pending >> (*blen - 1) != 0 && *pending >> *blen == 0);
    let mut ntz = 0;
    while *pending & 1 == 0 {
        ntz += 1;
        *pending >>= 1;
    }
    debug_assert!(ntz < *blen);
    for _ in 0..(*blen - ntz) {
        *z = mult(z, z, c)?;
    }
    *z = mult(z, &table[(*pending >> 1) as usize], c)?;
    for _ in 0..ntz {
        *z = mult(z, z, c)?;
    }
    *pending = 0;
    *blen = 0;
    Ok(())
}

/// Left-to-right binary exponentiation. `b` must be at least 2.
fn pow_binary(a: &BigInt, b: &BigInt, c: Option<&BigInt>) -> Result<BigInt> {
    let mut z = a.clone();
    let mut idx = b.ndigits() - 1;
    let mut bi = b.digits[idx];
    debug_assert!(bi != 0);

    // Locate the bit below the most significant one of the top digit.
    let mut bit: Digit = 2;
    loop {
        if bit > bi {
            bit >>= 1;
            break;
        }
        bit <<= 1;
    }
    bit >>= 1;

    loop {
        while bit != 0 {
            z = mult(&z, &z, c)?;
            if bi & bit != 0 {
                z = mult(&z, a, c)?;
            }
            bit >>= 1;
        }
        if idx == 0 {
            break;
        }
        idx -= 1;
        bi = b.digits[idx];
        bit = (1 as Digit) << (SHIFT - 1);
    }
    Ok(z)
}

/// Left-to-right k-ary sliding-window exponentiation.
fn pow_windowed(a: &BigInt, b: &BigInt, c: Option<&BigInt>) -> Result<BigInt> {
    // table[i] == a**(2*i + 1), reduced.
    let mut table = Vec::with_capacity(EXP_TABLE_LEN);
    table.push(a.clone());
    let a2 = mult(a, a, c)?;
    for i in 1..EXP_TABLE_LEN {
        let next = mult(&table[i - 1], &a2, c)?;
        table.push(next);
    }

    let mut z = BigInt::one();
    let mut pending: u32 = 0;
    let mut blen: u32 = 0;
    for idx in (0..b.ndigits()).rev() {
        let bi = b.digits[idx];
        for j in (0..SHIFT).rev() {
            let bit = (bi >> j) & 1;
            pending = (pending << 1) | bit as u32;
            if pending != 0 {
                blen += 1;
                if blen == EXP_WINDOW_SIZE {
                    absorb_pending(&mut z, &table, &mut pending, &mut blen, c)?;
                }
            } else {
                // absorb strings of 0 bits
                z = mult(&z, &z, c)?;
            }
        }
    }
    if pending != 0 {
        absorb_pending(&mut z, &table, &mut pending, &mut blen, c)?;
    }
    Ok(z)
}

/// `base**exp`, optionally modulo `modulus`.
pub(crate) fn pow_mod(base: &BigInt, exp: &BigInt, modulus: Option<&BigInt>) -> Result<BigInt> {
    let mut a = base.clone();
    let mut b = exp.clone();
    let mut negative_output = false;

    let c: Option<BigInt> = match modulus {
        None => {
            if b.is_negative() {
                // A negative exponent without a modulus is not an integer
                // result; the runtime's float power handles that case.
                return Err(Error::NegativeExponent);
            }
            None
        }
        Some(m) => {
            if m.is_zero() {
                return Err(Error::ZeroModulus);
            }
            let mut m = m.clone();
            if m.is_negative() {
                negative_output = true;
                m = m.negated();
            }
            if m.is_one() {
                return Ok(BigInt::zero());
            }
            // A negative exponent flips the base to its modular inverse.
            if b.is_negative() {
                b = b.negated();
                a = gcd::invmod_positive(&a, &m)?;
            }
            // Reduce the base up front when it is negative or obviously
            // larger than the modulus; both later strategies multiply by
            // the base directly, so a small base pays off.
            if a.is_negative() || a.ndigits() > m.ndigits() {
                a = div::rem_floor(&a, &m)?;
            }
            Some(m)
        }
    };
    let c = c.as_ref();

    let ndigits = b.ndigits();
    let top: Digit = if ndigits == 0 { 0 } else { b.digits[ndigits - 1] };

    let mut z;
    if ndigits <= 1 && top <= 3 {
        // Minimal overhead for the overwhelmingly common tiny exponents.
        z = BigInt::one();
        if top >= 2 {
            z = mult(&a, &a, c)?;
            if top == 3 {
                z = mult(&z, &a, c)?;
            }
        } else if top == 1 {
            // One multiplication both normalizes and reduces the base.
            z = mult(&a, &z, c)?;
        }
    } else if ndigits as u32 <= HUGE_EXP_CUTOFF / SHIFT {
        z = pow_binary(&a, &b, c)?;
    } else {
        log::trace!(
            "sliding-window pow: exponent of {} bits, window {}",
            b.bit_length(),
            EXP_WINDOW_SIZE
        );
        z = pow_windowed(&a, &b, c)?;
    }

    if negative_output && !z.is_zero() {
        z = arith::sub(&z, c.expect("negative output implies a modulus"));
    }
    Ok(z)
}

impl BigInt {
    /// `self**exponent`, optionally reduced modulo `modulus`. With a
    /// modulus the exponent may be negative (the base is replaced by its
    /// modular inverse); without one a negative exponent is an error,
    /// since the result would not be an integer.
    pub fn pow_mod(&self, exponent: &BigInt, modulus: Option<&BigInt>) -> Result<BigInt> {
        pow_mod(self, exponent, modulus)
    }

    /// Plain integer power.
    pub fn pow(&self, exponent: u64) -> BigInt {
        pow_mod(self, &BigInt::from(exponent), None)
            .expect("non-modular power of an unsigned exponent cannot fail")
    }
}
