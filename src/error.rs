//! Error reporting for the integer engine.
//!
//! Every fallible operation returns [`Result`]. The embedding runtime maps
//! each kind onto its own signalling mechanism (exception, condition, error
//! value); this crate only reports the kind plus a human-readable fragment.

use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Divisor (or modulus in an inverse computation) was zero.
    DivisionByZero,
    /// The result does not fit the requested target representation, or the
    /// computation would exceed the absolute digit-count ceiling.
    Overflow(&'static str),
    /// Malformed numeric literal for the given base; `pos` is the byte
    /// offset of the first offending character.
    InvalidLiteral { base: u32, pos: usize },
    /// Base outside 2..=36 (or 0 for auto-detection where allowed).
    InvalidBase { base: u32 },
    /// The base has no inverse modulo the given modulus.
    NotInvertible,
    /// Modular exponentiation with a zero modulus.
    ZeroModulus,
    /// Negative exponent without a modulus is not an integer result.
    NegativeExponent,
    /// A non-binary string conversion crossed the configured digit ceiling.
    DigitLimitExceeded { limit: usize, digits: usize },
    /// NaN cannot be converted to an integer.
    NanConversion,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DivisionByZero => f.write_str("integer division or modulo by zero"),
            Error::Overflow(what) => write!(f, "{}", what),
            Error::InvalidLiteral { base, pos } => {
                write!(
                    f,
                    "invalid literal for integer with base {} at byte {}",
                    base, pos
                )
            }
            Error::InvalidBase { base } => {
                write!(f, "base must be 0 or in 2..=36, got {}", base)
            }
            Error::NotInvertible => f.write_str("base is not invertible for the given modulus"),
            Error::ZeroModulus => f.write_str("pow() modulus cannot be 0"),
            Error::NegativeExponent => {
                f.write_str("negative exponent without a modulus is not an integer")
            }
            Error::DigitLimitExceeded { limit, digits } => write!(
                f,
                "exceeds the limit ({} digits) for integer string conversion: \
                 value has {} digits",
                limit, digits
            ),
            Error::NanConversion => f.write_str("cannot convert float NaN to integer"),
        }
    }
}

impl std::error::Error for Error {}
