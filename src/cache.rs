//! Process-wide context: the small-integer cache and host configuration.
//!
//! Real programs spend most of their integer arithmetic on small values, so
//! every constructor funnels results in a fixed range through a preallocated
//! table instead of rebuilding the digit vector each time. The table lives in
//! a [`Context`]; a process-wide default is initialized exactly once behind
//! `once_cell::sync::Lazy` and is read-only afterwards, so no locking is
//! needed. Hosts that want different string-conversion limits build their own
//! `Context` and pass it to the checked parse/format entry points.

use once_cell::sync::Lazy;

use crate::bigint::BigInt;
use crate::digit::{Digit, MASK};
use crate::error::Result;
use crate::format;
use crate::parse;

/// Smallest cached value is `-SMALL_NEG`.
pub(crate) const SMALL_NEG: i64 = 5;
/// Cached non-negative values are `0..SMALL_POS`.
pub(crate) const SMALL_POS: i64 = 257;

/// Default ceiling on significant digits for non-binary string conversion.
pub const DEFAULT_MAX_STR_DIGITS: usize = 4300;
/// Inputs and outputs below this many digits are never limited.
pub const STR_DIGITS_CHECK_THRESHOLD: usize = 640;

static GLOBAL: Lazy<Context> = Lazy::new(Context::new);

pub struct Context {
    smalls: Vec<BigInt>,
    max_str_digits: usize,
}

impl Context {
    /// Build a context with the default string-conversion limit.
    pub fn new() -> Context {
        Context::with_max_str_digits(DEFAULT_MAX_STR_DIGITS)
    }

    /// Build a context with an explicit digit ceiling; `0` disables the
    /// limit entirely.
    pub fn with_max_str_digits(max_str_digits: usize) -> Context {
        let mut smalls = Vec::with_capacity((SMALL_NEG + SMALL_POS) as usize);
        for v in -SMALL_NEG..SMALL_POS {
            // Construct directly from the magnitude; going through the
            // public constructors would consult the table being built.
            let mag = v.unsigned_abs();
            debug_assert!(mag <= MASK as u64);
            let digits = if mag == 0 {
                Vec::new()
            } else {
                vec![mag as Digit]
            };
            smalls.push(BigInt::from_sign_digits(v.signum() as i8, digits));
        }
        Context {
            smalls,
            max_str_digits,
        }
    }

    /// The shared default context.
    pub fn global() -> &'static Context {
        &GLOBAL
    }

    /// Cached instance for `v`, when `v` lies in the cached range.
    #[inline]
    pub(crate) fn small(&self, v: i64) -> Option<BigInt> {
        if (-SMALL_NEG..SMALL_POS).contains(&v) {
            Some(self.smalls[(v + SMALL_NEG) as usize].clone())
        } else {
            None
        }
    }

    /// Digit ceiling for non-binary string conversion; `0` means unlimited.
    pub fn max_str_digits(&self) -> usize {
        self.max_str_digits
    }

    /// Parse a literal in `base` (0 auto-detects from a `0x`/`0o`/`0b`
    /// prefix), honoring this context's digit ceiling.
    pub fn parse(&self, s: &str, base: u32) -> Result<BigInt> {
        parse::parse_with(self, s, base)
    }

    /// Format `v` in `base` (2..=36), honoring this context's digit ceiling
    /// for non-binary bases. `alternate` prepends `0b`/`0o`/`0x` for bases
    /// 2, 8 and 16.
    pub fn format(&self, v: &BigInt, base: u32, alternate: bool) -> Result<String> {
        format::format_with(self, v, base, alternate)
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digit::SHIFT;

    #[test]
    fn cached_range_is_single_digit() {
        // The table construction assumes every cached magnitude fits one limb.
        assert!(SMALL_POS as u64 <= MASK as u64);
        assert!(SHIFT >= 9);
    }

    #[test]
    fn small_values_come_from_the_table() {
        let ctx = Context::global();
        assert_eq!(ctx.small(0).unwrap(), BigInt::zero());
        assert_eq!(ctx.small(-5).unwrap(), BigInt::from(-5));
        assert_eq!(ctx.small(256).unwrap(), BigInt::from(256));
        assert!(ctx.small(257).is_none());
        assert!(ctx.small(-6).is_none());
    }

    #[test]
    fn cache_transparency() {
        // Two hits for the same value behave exactly like a fresh value.
        let a = BigInt::from(5);
        let b = BigInt::from(5);
        assert_eq!(a, b);
        let fresh = BigInt::from(1000) - BigInt::from(995);
        assert_eq!(a, fresh);
        assert_eq!(&a * &fresh, BigInt::from(25));
    }
}
