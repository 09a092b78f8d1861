//! Fixed-size carry accumulators used by [`crate::num3072`]'s fused
//! schoolbook multiplier.
//!
//! A "2-accumulator" `[low, high]` and a "3-accumulator" `[low, high, carry]`
//! are plain `u64` arrays treated as little-endian multi-limb integers. Every
//! primitive here is a pure function of its operands and promotes to `u128`
//! for the widening multiply, the same technique the teacher's limb layer
//! uses for `mac`/`adc`.

/// A single limb of a [`crate::num3072::Num3072`].
pub type Limb = u64;

/// The natural width of a limb×limb product.
pub type WideLimb = u128;

pub const LIMB_BITS: u32 = Limb::BITS;

/// `a * b`, promoted to avoid overflow.
#[inline(always)]
const fn widening_mul(a: Limb, b: Limb) -> WideLimb {
    a as WideLimb * b as WideLimb
}

/// `(low, high) = a * b`.
#[inline(always)]
pub const fn mul(a: Limb, b: Limb) -> (Limb, Limb) {
    let t = widening_mul(a, b);
    (t as Limb, (t >> LIMB_BITS) as Limb)
}

/// `[c0, c1, c2] += a * b`.
///
/// `c2` never overflows across the column sums `Num3072::multiply` and
/// `Num3072::square` accumulate: each column sums at most `LIMBS` limb
/// products (`< LIMBS * 2^128`), comfortably under the `2^192` a 3-limb
/// accumulator holds, so this is a plain wrapping add rather than a checked
/// one.
#[inline(always)]
pub fn muladd3(acc: &mut [Limb; 3], a: Limb, b: Limb) {
    let t = widening_mul(a, b);
    let tl = t as Limb;
    let th = (t >> LIMB_BITS) as Limb;

    let (low, carry0) = acc[0].overflowing_add(tl);
    acc[0] = low;
    let th = th.wrapping_add(carry0 as Limb);

    let (high, carry1) = acc[1].overflowing_add(th);
    acc[1] = high;
    acc[2] = acc[2].wrapping_add(carry1 as Limb);
}

/// `[c0, c1, c2] += 2 * a * b`.
///
/// Computes `a * b` once and folds it into the accumulator twice, rather than
/// doubling the product before adding, so the intermediate never needs a
/// fourth limb.
#[inline(always)]
pub fn muldbladd3(acc: &mut [Limb; 3], a: Limb, b: Limb) {
    let t = widening_mul(a, b);
    let tl = t as Limb;
    let th = (t >> LIMB_BITS) as Limb;

    for _ in 0..2 {
        let (low, carry0) = acc[0].overflowing_add(tl);
        acc[0] = low;
        let th = th.wrapping_add(carry0 as Limb);

        let (high, carry1) = acc[1].overflowing_add(th);
        acc[1] = high;
        acc[2] = acc[2].wrapping_add(carry1 as Limb);
    }
}

/// `[low, high] *= n`.
///
/// The would-be third limb of the product is discarded; callers must
/// guarantee it is zero (true whenever `n == K`, since `[low, high]` here is
/// always a residual far below `2^128 / K`).
#[inline(always)]
pub fn muln2(acc: &mut [Limb; 2], n: Limb) {
    let mut t = widening_mul(acc[0], n);
    acc[0] = t as Limb;
    t >>= LIMB_BITS;
    t += widening_mul(acc[1], n);
    acc[1] = t as Limb;
}

/// `[c0, c1, c2] += n * [d0, d1, d2]`. `d2` is small enough that `d2 * n`
/// cannot overflow a limb within the call sequence this is used in.
#[inline(always)]
pub fn mulnadd3(acc: &mut [Limb; 3], d: &[Limb; 3], n: Limb) {
    let mut t = widening_mul(d[0], n) + acc[0] as WideLimb;
    acc[0] = t as Limb;
    t >>= LIMB_BITS;

    t += widening_mul(d[1], n) + acc[1] as WideLimb;
    acc[1] = t as Limb;
    t >>= LIMB_BITS;

    acc[2] = t as Limb + d[2].wrapping_mul(n);
}

/// Extract the lowest limb of `[low, high, carry]` and shift the accumulator
/// down by one limb.
#[inline(always)]
pub fn extract3(acc: &mut [Limb; 3]) -> Limb {
    let n = acc[0];
    acc[0] = acc[1];
    acc[1] = acc[2];
    acc[2] = 0;
    n
}

/// `[low, high] += a`, then extract the lowest limb and shift down by one
/// limb.
///
/// Handles the rare double-overflow (low wraps *and* high then wraps from
/// `0` back to `0`) by setting the new high limb to `1` instead of `0`.
#[inline(always)]
pub fn addnextract2(acc: &mut [Limb; 2], a: Limb) -> Limb {
    let (low, carry) = acc[0].overflowing_add(a);
    acc[0] = low;

    let mut carry_out = 0;
    if carry {
        let (high, double_carry) = acc[1].overflowing_add(1);
        acc[1] = high;
        if double_carry {
            carry_out = 1;
        }
    }

    let n = acc[0];
    acc[0] = acc[1];
    acc[1] = carry_out;
    n
}
