//! Integer to string conversion.
//!
//! Power-of-two bases extract fixed bit groups per output character, linear
//! in the limb count. Every other base converts through "super-digit"
//! chunks of `base**k`, the largest power fitting under the limb base, so
//! each pass of the quadratic chunk loop amortizes one full division over
//! `k` output characters (Knuth TAOCP vol. 2 section 4.4, Method 1b). The
//! quadratic path honors the context's digit ceiling; the exact output
//! length is computed up front so the buffer is filled right-to-left with
//! no reallocation.

use std::fmt;

use crate::bigint::BigInt;
use crate::cache::{Context, STR_DIGITS_CHECK_THRESHOLD};
use crate::digit::{Digit, DoubleDigit, DECIMAL_BASE, DECIMAL_SHIFT, MASK, SHIFT};
use crate::error::{Error, Result};

const DIGIT_CHARS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Linear formatter for power-of-two bases.
fn format_binary(v: &BigInt, base: u32, alternate: bool) -> String {
    debug_assert!(base.is_power_of_two() && (2..=32).contains(&base));
    let bits = base.trailing_zeros();
    let negative = v.is_negative();

    let body_len = if v.is_zero() {
        1
    } else {
        ((v.bit_length() + bits as u64 - 1) / bits as u64) as usize
    };
    let prefix: &[u8] = if alternate {
        match base {
            2 => b"0b",
            8 => b"0o",
            16 => b"0x",
            _ => b"",
        }
    } else {
        b""
    };
    let sz = negative as usize + prefix.len() + body_len;
    let mut out = vec![0u8; sz];
    let mut p = sz;

    if v.is_zero() {
        p -= 1;
        out[p] = b'0';
    } else {
        let digits = v.digits();
        let mut accum: DoubleDigit = 0;
        let mut accumbits: u32 = 0;
        for (i, &d) in digits.iter().enumerate() {
            accum |= (d as DoubleDigit) << accumbits;
            accumbits += SHIFT;
            debug_assert!(accumbits >= bits);
            loop {
                let c = (accum & (base as DoubleDigit - 1)) as usize;
                p -= 1;
                out[p] = DIGIT_CHARS[c];
                accumbits -= bits;
                accum >>= bits;
                let more = if i < digits.len() - 1 {
                    accumbits >= bits
                } else {
                    accum > 0
                };
                if !more {
                    break;
                }
            }
        }
    }

    for &b in prefix.iter().rev() {
        p -= 1;
        out[p] = b;
    }
    if negative {
        p -= 1;
        out[p] = b'-';
    }
    debug_assert_eq!(p, 0);
    String::from_utf8(out).expect("ascii digits")
}

/// Chunk parameters for a non-binary base: `(k, base**k)` with `base**k`
/// the largest power not exceeding the limb mask.
fn conversion_chunk(base: u32) -> (u32, DoubleDigit) {
    let mut width = 0;
    let mut chunk: DoubleDigit = 1;
    while chunk * base as DoubleDigit <= MASK as DoubleDigit {
        chunk *= base as DoubleDigit;
        width += 1;
    }
    (width, chunk)
}

/// Quadratic formatter for non-binary bases, with the digit ceiling
/// applied when `limit` is nonzero.
fn format_non_binary(v: &BigInt, base: u32, limit: usize) -> Result<String> {
    let (chunk_width, chunk_base) = conversion_chunk(base);
    if base == 10 {
        debug_assert_eq!((chunk_width, chunk_base), (DECIMAL_SHIFT, DECIMAL_BASE as DoubleDigit));
    }

    // Cheap lower bound on the output length lets enormous values fail
    // before any quadratic work happens: every output character carries at
    // most log2(36) < 6 bits.
    let bits = v.bit_length();
    if limit > 0 && bits / 6 > limit.max(STR_DIGITS_CHECK_THRESHOLD) as u64 {
        return Err(Error::DigitLimitExceeded {
            limit,
            digits: (bits / 6) as usize,
        });
    }

    // Convert the base-2**SHIFT limbs into base**chunk_width super-digits.
    let negative = v.is_negative();
    let mut pout: Vec<Digit> = Vec::new();
    for &d in v.digits().iter().rev() {
        let mut hi = d;
        for out in pout.iter_mut() {
            let z = ((*out as DoubleDigit) << SHIFT) | hi as DoubleDigit;
            hi = (z / chunk_base) as Digit;
            *out = (z - hi as DoubleDigit * chunk_base) as Digit;
        }
        while hi != 0 {
            pout.push(hi % chunk_base as Digit);
            hi /= chunk_base as Digit;
        }
    }
    if pout.is_empty() {
        pout.push(0);
    }

    // Exact output length: full chunks contribute chunk_width characters,
    // the top chunk only what it needs.
    let size = pout.len();
    let mut top_digits = 1;
    let mut power = base as DoubleDigit;
    while pout[size - 1] as DoubleDigit >= power {
        power *= base as DoubleDigit;
        top_digits += 1;
    }
    let body_len = (size - 1) * chunk_width as usize + top_digits;
    if body_len > STR_DIGITS_CHECK_THRESHOLD && limit > 0 && body_len > limit {
        return Err(Error::DigitLimitExceeded {
            limit,
            digits: body_len,
        });
    }

    let sz = negative as usize + body_len;
    let mut out = vec![0u8; sz];
    let mut p = sz;
    for &chunk in &pout[..size - 1] {
        let mut rem = chunk;
        for _ in 0..chunk_width {
            p -= 1;
            out[p] = DIGIT_CHARS[(rem % base as Digit) as usize];
            rem /= base as Digit;
        }
    }
    let mut rem = pout[size - 1];
    loop {
        p -= 1;
        out[p] = DIGIT_CHARS[(rem % base as Digit) as usize];
        rem /= base as Digit;
        if rem == 0 {
            break;
        }
    }
    if negative {
        p -= 1;
        out[p] = b'-';
    }
    debug_assert_eq!(p, 0);
    Ok(String::from_utf8(out).expect("ascii digits"))
}

pub(crate) fn format_with(
    ctx: &Context,
    v: &BigInt,
    base: u32,
    alternate: bool,
) -> Result<String> {
    if !(2..=36).contains(&base) {
        return Err(Error::InvalidBase { base });
    }
    if base.is_power_of_two() {
        Ok(format_binary(v, base, alternate))
    } else {
        format_non_binary(v, base, ctx.max_str_digits())
    }
}

/// Formatting without a ceiling, for the `Display` family.
fn format_unlimited(v: &BigInt, base: u32) -> String {
    if base.is_power_of_two() {
        format_binary(v, base, false)
    } else {
        format_non_binary(v, base, 0).expect("unlimited formatting cannot fail")
    }
}

impl BigInt {
    /// Render in the given base (2..=36) through the global context; the
    /// non-binary digit ceiling applies.
    pub fn to_str_radix(&self, base: u32) -> Result<String> {
        Context::global().format(self, base, false)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_unlimited(self, 10))
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Binary for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_binary(self, 2, f.alternate()))
    }
}

impl fmt::Octal for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_binary(self, 8, f.alternate()))
    }
}

impl fmt::LowerHex for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_binary(self, 16, f.alternate()))
    }
}

impl fmt::UpperHex for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format_binary(self, 16, f.alternate()).to_ascii_uppercase();
        // keep the prefix lowercase like the native integer formatters
        f.write_str(&s.replace("0X", "0x"))
    }
}
