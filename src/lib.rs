//! Arbitrary precision integers for the Mara runtime.
//!
//! # Why not use num-bigint?
//!
//! num-bigint is an excellent library, but the runtime's integer type has
//! semantics it does not provide: floor division with the remainder
//! following the divisor's sign, arithmetic right shift, modular
//! exponentiation with negative exponents, correctly rounded conversions at
//! the double boundary, and host-configurable ceilings on the quadratic
//! string conversions. The interpreter also leans hard on a small-integer
//! cache tuned to its allocation profile, so the engine lives here where
//! those pieces can be built in.
//!
//! Values are immutable once constructed; every operation returns a fresh
//! (or cached) [`BigInt`]. Independent values can therefore be used from
//! multiple threads freely, and the only shared state, the small-integer
//! table, is initialized once and read-only afterwards.

mod arith;
mod bigint;
mod bits;
mod bytes;
mod cache;
mod digit;
mod div;
mod error;
mod float;
mod format;
mod gcd;
mod mul;
mod ops;
mod parse;
mod pow;

pub use bigint::{BigInt, DigitLayout};
pub use bytes::Endian;
pub use cache::{Context, DEFAULT_MAX_STR_DIGITS, STR_DIGITS_CHECK_THRESHOLD};
pub use digit::{Digit, BASE, MASK, SHIFT};
pub use error::{Error, Result};
