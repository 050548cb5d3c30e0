//! Operator trait implementations.
//!
//! Arithmetic operators follow the language semantics of the integer type
//! they implement: `/` and `%` are floor division and true modulo (the
//! remainder carries the divisor's sign), `>>` is arithmetic, and the
//! bitwise operators act on the two's-complement view. Fallible conditions
//! panic here exactly like the native integer operators; callers that need
//! to observe the error use the checked methods instead.

use std::cmp::Ordering;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use num_traits::{Num, One, Signed, Zero};

use crate::arith;
use crate::bigint::BigInt;
use crate::bits;
use crate::div;
use crate::error::Error;
use crate::mul;

fn div_op(a: &BigInt, b: &BigInt) -> BigInt {
    match div::div_floor(a, b) {
        Ok(q) => q,
        Err(_) => panic!("attempt to divide by zero"),
    }
}

fn rem_op(a: &BigInt, b: &BigInt) -> BigInt {
    match div::rem_floor(a, b) {
        Ok(r) => r,
        Err(_) => panic!("attempt to calculate the remainder with a divisor of zero"),
    }
}

fn and_op(a: &BigInt, b: &BigInt) -> BigInt {
    bits::bitwise(a, b'&', b)
}

fn or_op(a: &BigInt, b: &BigInt) -> BigInt {
    bits::bitwise(a, b'|', b)
}

fn xor_op(a: &BigInt, b: &BigInt) -> BigInt {
    bits::bitwise(a, b'^', b)
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $func:path) => {
        impl $trait<&BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                $func(self, rhs)
            }
        }

        impl $trait<BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                $func(self, &rhs)
            }
        }

        impl $trait<&BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                $func(&self, rhs)
            }
        }

        impl $trait for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                $func(&self, &rhs)
            }
        }
    };
}

forward_binop!(Add, add, arith::add);
forward_binop!(Sub, sub, arith::sub);
forward_binop!(Mul, mul, mul::mul);
forward_binop!(Div, div, div_op);
forward_binop!(Rem, rem, rem_op);
forward_binop!(BitAnd, bitand, and_op);
forward_binop!(BitOr, bitor, or_op);
forward_binop!(BitXor, bitxor, xor_op);

impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        self.negated()
    }
}

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        self.negated()
    }
}

impl Not for &BigInt {
    type Output = BigInt;
    fn not(self) -> BigInt {
        bits::invert(self)
    }
}

impl Not for BigInt {
    type Output = BigInt;
    fn not(self) -> BigInt {
        bits::invert(&self)
    }
}

macro_rules! impl_shifts {
    ($($t:ty),* $(,)?) => {$(
        impl Shl<$t> for &BigInt {
            type Output = BigInt;
            fn shl(self, rhs: $t) -> BigInt {
                match bits::checked_shl(self, rhs as u64) {
                    Ok(v) => v,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl Shl<$t> for BigInt {
            type Output = BigInt;
            fn shl(self, rhs: $t) -> BigInt {
                &self << rhs
            }
        }

        impl Shr<$t> for &BigInt {
            type Output = BigInt;
            fn shr(self, rhs: $t) -> BigInt {
                bits::shr(self, rhs as u64)
            }
        }

        impl Shr<$t> for BigInt {
            type Output = BigInt;
            fn shr(self, rhs: $t) -> BigInt {
                bits::shr(&self, rhs as u64)
            }
        }
    )*};
}

impl_shifts!(u32, u64, usize);

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &BigInt) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &BigInt) -> Ordering {
        self.cmp_value(other)
    }
}

impl Zero for BigInt {
    fn zero() -> BigInt {
        BigInt::zero()
    }

    fn is_zero(&self) -> bool {
        BigInt::is_zero(self)
    }
}

impl One for BigInt {
    fn one() -> BigInt {
        BigInt::one()
    }

    fn is_one(&self) -> bool {
        BigInt::is_one(self)
    }
}

impl Num for BigInt {
    type FromStrRadixErr = Error;

    fn from_str_radix(s: &str, radix: u32) -> Result<BigInt, Error> {
        BigInt::from_str_radix(s, radix)
    }
}

impl Signed for BigInt {
    fn abs(&self) -> BigInt {
        BigInt::abs(self)
    }

    fn abs_sub(&self, other: &BigInt) -> BigInt {
        if self <= other {
            BigInt::zero()
        } else {
            self - other
        }
    }

    fn signum(&self) -> BigInt {
        BigInt::signum(self)
    }

    fn is_positive(&self) -> bool {
        BigInt::is_positive(self)
    }

    fn is_negative(&self) -> bool {
        BigInt::is_negative(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i128) -> BigInt {
        BigInt::from_i128(v)
    }

    #[test]
    fn operator_smoke() {
        let a = big(1000);
        let b = big(-7);
        assert_eq!(&a + &b, big(993));
        assert_eq!(&a - &b, big(1007));
        assert_eq!(&a * &b, big(-7000));
        assert_eq!(&a / &b, big(-143)); // floor
        assert_eq!(&a % &b, big(-1)); // divisor sign
        assert_eq!(-&a, big(-1000));
        assert_eq!(!&a, big(-1001));
        assert_eq!(big(0b1100) & big(0b1010), big(0b1000));
        assert_eq!(big(0b1100) | big(0b1010), big(0b1110));
        assert_eq!(big(0b1100) ^ big(0b1010), big(0b0110));
        assert_eq!(big(3) << 4u32, big(48));
        assert_eq!(big(-48) >> 4u32, big(-3));
    }

    #[test]
    #[should_panic(expected = "divide by zero")]
    fn operator_division_by_zero_panics() {
        let _ = big(1) / big(0);
    }

    #[test]
    fn ordering_is_total_and_signed() {
        let mut vals: Vec<BigInt> = [-300, 5, -5, 0, 1 << 90, -(1 << 90), 256]
            .iter()
            .map(|&v| big(v))
            .collect();
        vals.sort();
        let rendered: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            [
                (-(1i128 << 90)).to_string(),
                "-300".to_string(),
                "-5".to_string(),
                "0".to_string(),
                "5".to_string(),
                "256".to_string(),
                (1i128 << 90).to_string()
            ]
        );
    }

    #[test]
    fn num_traits_integration() {
        assert!(<BigInt as Zero>::zero().is_zero());
        assert!(<BigInt as One>::one().is_one());
        assert_eq!(
            <BigInt as Num>::from_str_radix("ff", 16).unwrap(),
            big(255)
        );
        assert_eq!(Signed::abs(&big(-9)), big(9));
        assert_eq!(Signed::signum(&big(-9)), big(-1));
        assert_eq!(Signed::abs_sub(&big(3), &big(10)), big(0));
        assert_eq!(Signed::abs_sub(&big(10), &big(3)), big(7));
    }
}
