//! Multiplication: schoolbook, Karatsuba, and the lopsided-operand variant.
//!
//! The cutover points follow the classical shape: grade-school digit-pair
//! accumulation below `KARATSUBA_CUTOFF` limbs (doubled for squaring, which
//! exploits the symmetry of the multiplication pyramid), balanced Karatsuba
//! above it, and a slicing strategy when one operand is at least twice as
//! wide as the other so the recursion never sees a degenerate split.

use crate::arith::{mag_add, v_iadd, v_isub};
use crate::bigint::BigInt;
use crate::digit::{Digit, DoubleDigit, MASK, SHIFT};

pub(crate) const KARATSUBA_CUTOFF: usize = 70;
pub(crate) const KARATSUBA_SQUARE_CUTOFF: usize = 2 * KARATSUBA_CUTOFF;

/// View of `s` without most-significant zero limbs.
fn trimmed(mut s: &[Digit]) -> &[Digit] {
    while s.last() == Some(&0) {
        s = &s[..s.len() - 1];
    }
    s
}

fn same_operand(a: &[Digit], b: &[Digit]) -> bool {
    a.as_ptr() == b.as_ptr() && a.len() == b.len()
}

/// O(n*m) digit-pair accumulation for distinct operands.
fn schoolbook_mul(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let mut z = vec![0 as Digit; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        let f = ai as DoubleDigit;
        let mut carry: DoubleDigit = 0;
        for (j, &bj) in b.iter().enumerate() {
            carry += z[i + j] as DoubleDigit + bj as DoubleDigit * f;
            z[i + j] = carry as Digit & MASK;
            carry >>= SHIFT;
        }
        if carry != 0 {
            debug_assert!(carry >> SHIFT == 0 && z[i + b.len()] == 0);
            z[i + b.len()] = carry as Digit;
        }
    }
    z
}

/// Squaring, with each cross term of the pyramid added once at double
/// weight instead of twice (HAC 14.16).
fn schoolbook_sqr(a: &[Digit]) -> Vec<Digit> {
    let size = a.len();
    let mut z = vec![0 as Digit; 2 * size];
    for i in 0..size {
        let f = a[i] as DoubleDigit;
        let mut pz = i << 1;

        let mut carry: DoubleDigit = z[pz] as DoubleDigit + f * f;
        z[pz] = carry as Digit & MASK;
        pz += 1;
        carry >>= SHIFT;
        debug_assert!(carry <= MASK as DoubleDigit);

        let f2 = f << 1;
        for &aj in &a[i + 1..] {
            carry += z[pz] as DoubleDigit + aj as DoubleDigit * f2;
            z[pz] = carry as Digit & MASK;
            pz += 1;
            carry >>= SHIFT;
            debug_assert!(carry <= (MASK as DoubleDigit) << 1);
        }
        if carry != 0 {
            // pz sits at the highest carry position of the previous outer
            // iteration, so the stored digit is at most 1 and a second
            // cascade can only deposit a 1 into a still-zero slot.
            debug_assert!(z[pz] <= 1);
            carry += z[pz] as DoubleDigit;
            z[pz] = carry as Digit & MASK;
            carry >>= SHIFT;
            if carry != 0 {
                debug_assert!(carry == 1 && z[pz + 1] == 0);
                z[pz + 1] = carry as Digit;
            }
        }
    }
    z
}

/// Karatsuba product of two magnitudes (unnormalized output). The cutoffs
/// are threaded through so the equivalence tests can force every path on
/// small operands.
fn k_mul(a: &[Digit], b: &[Digit], cutoff: usize, square_cutoff: usize) -> Vec<Digit> {
    // Split based on the larger operand; fiddle so that b is the larger.
    let same = same_operand(a, b);
    let (a, b) = if a.len() > b.len() { (b, a) } else { (a, b) };
    let asize = a.len();
    let bsize = b.len();

    if asize <= if same { square_cutoff } else { cutoff } {
        if asize == 0 {
            return Vec::new();
        }
        return if same {
            schoolbook_sqr(a)
        } else {
            schoolbook_mul(a, b)
        };
    }

    if 2 * asize <= bsize {
        return lopsided_mul(a, b, cutoff, square_cutoff);
    }

    // Both operands are large and of comparable size: split each at half
    // the larger digit count and recurse with the 3-multiplication trick:
    //   a*b = ah*bh*X^2 + ((ah+al)(bh+bl) - ah*bh - al*bl)*X + al*bl
    // where X = BASE^shift, so the X scalings are just placements at limb
    // offsets inside one shared result buffer.
    let shift = bsize >> 1;
    log::trace!("karatsuba split: {}x{} limbs at {}", asize, bsize, shift);
    let al = trimmed(&a[..shift.min(asize)]);
    let ah = trimmed(&a[shift.min(asize)..]);
    debug_assert!(!ah.is_empty());
    let (bl, bh) = (trimmed(&b[..shift]), trimmed(&b[shift..]));

    let mut ret = vec![0 as Digit; asize + bsize];

    // ah*bh into the high limbs, al*bl into the low limbs; the two cannot
    // overlap.
    let t1 = if same {
        k_mul(ah, ah, cutoff, square_cutoff)
    } else {
        k_mul(ah, bh, cutoff, square_cutoff)
    };
    ret[2 * shift..2 * shift + t1.len()].copy_from_slice(&t1);
    let t2 = if same {
        k_mul(al, al, cutoff, square_cutoff)
    } else {
        k_mul(al, bl, cutoff, square_cutoff)
    };
    ret[..t2.len()].copy_from_slice(&t2);

    // Subtract both partial products at the middle offset. Borrows out of
    // the high digit are fine: we work mod BASE^(asize+bsize) and the final
    // result is known to fit.
    v_isub(&mut ret[shift..], trimmed(&t2));
    v_isub(&mut ret[shift..], trimmed(&t1));

    // Add (ah+al)*(bh+bl) at the same offset; the buffer is always wide
    // enough for this term.
    let ta = mag_add(ah, al);
    let t3 = if same {
        k_mul(&ta, &ta, cutoff, square_cutoff)
    } else {
        let tb = mag_add(bh, bl);
        k_mul(&ta, &tb, cutoff, square_cutoff)
    };
    v_iadd(&mut ret[shift..], trimmed(&t3));

    ret
}

/// `b` has at least twice the limbs of `a`: view `b` as slices of `a`'s
/// width and feed balanced products to `k_mul`, accumulating each partial
/// product at its limb offset.
fn lopsided_mul(a: &[Digit], b: &[Digit], cutoff: usize, square_cutoff: usize) -> Vec<Digit> {
    let asize = a.len();
    let bsize = b.len();
    debug_assert!(asize > cutoff && 2 * asize <= bsize);
    log::trace!("lopsided multiply: {}x{} limbs", asize, bsize);

    let mut ret = vec![0 as Digit; asize + bsize];
    let mut nbdone = 0;
    while nbdone < bsize {
        let nbtouse = (bsize - nbdone).min(asize);
        let bslice = trimmed(&b[nbdone..nbdone + nbtouse]);
        let product = k_mul(a, bslice, cutoff, square_cutoff);
        v_iadd(&mut ret[nbdone..], trimmed(&product));
        nbdone += nbtouse;
    }
    ret
}

/// `|a| * |b|` with the production cutoffs.
pub(crate) fn mag_mul(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    k_mul(a, b, KARATSUBA_CUTOFF, KARATSUBA_SQUARE_CUTOFF)
}

/// Signed product.
pub(crate) fn mul(a: &BigInt, b: &BigInt) -> BigInt {
    if a.is_compact() && b.is_compact() {
        return BigInt::from_medium(a.medium_value() * b.medium_value());
    }
    if a.is_zero() || b.is_zero() {
        return BigInt::zero();
    }
    // squaring is detected inside by operand identity
    let mag = mag_mul(&a.digits, &b.digits);
    BigInt::from_sign_digits(a.sign * b.sign, mag)
}
