//! `Num3072`: a 3072-bit residue modulo `P = 2^3072 - K`, `K = 1103717`.
//!
//! `P` is a pseudo-Mersenne prime: `2^3072 ≡ K (mod P)`, so any bit at
//! position `>= 3072` can be folded back in as `K` copies at position `0`
//! instead of performed via a general division. [`Num3072::multiply`] and
//! [`Num3072::square`] exploit exactly that to produce a fused
//! multiply-and-reduce schoolbook routine that only ever materializes
//! [`LIMBS`] limbs of output.
//!
//! The representation is redundant: a [`Num3072`] may transiently hold a
//! value up to `2^3072 - 1`, i.e. slightly more than `P`. [`Num3072::multiply`],
//! [`Num3072::square`], and [`Num3072::divide`] always leave their
//! destination canonical (`< P`); callers never need to normalize by hand.

use core::fmt;

use zeroize::Zeroize;

use crate::arithmetic::limb::{
    addnextract2, extract3, mul, muladd3, muldbladd3, mulnadd3, muln2, Limb,
};

/// Number of limbs in a [`Num3072`]. `LIMBS * LIMB_SIZE == 3072`.
pub const LIMBS: usize = 48;

/// Bit width of a single limb.
pub const LIMB_SIZE: u32 = Limb::BITS;

/// `P = 2^3072 - K`.
const K: Limb = 1_103_717;

/// `out^(2^squarings) * p[index]`, one step of [`Num3072::get_inverse`]'s
/// addition chain for the exponent `P - 2`. The schedule is a constant of
/// the algorithm (Brumley & Järvinen, 2008 windowing over repunits): reading
/// the pairs left to right and letting `p[i] = a^(2^(2^i) - 1)`, the chain
/// starting from `p[11]` accumulates exactly `2^3072 - K - 2`. It must be
/// reproduced exactly rather than re-derived.
const INVERSE_CHAIN: &[(u32, usize)] = &[
    (512, 9),
    (256, 8),
    (128, 7),
    (64, 6),
    (32, 5),
    (8, 3),
    (2, 1),
    (1, 0),
    (5, 2),
    (3, 0),
    (2, 0),
    (4, 0),
    (4, 1),
    (3, 0),
];

/// An element of `Z/PZ`, represented as [`LIMBS`] little-endian limbs.
///
/// A `Num3072` is a plain, `Copy` value with no allocation and no lifetime
/// beyond the caller's own storage. See the module documentation for the
/// redundant (possibly `>= P`) representation this type tolerates between
/// calls to [`Num3072::multiply`]/[`Num3072::square`]/[`Num3072::divide`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Zeroize)]
pub struct Num3072 {
    limbs: [Limb; LIMBS],
}

impl Default for Num3072 {
    /// The additive identity, `0`. Not to be confused with
    /// [`Num3072::set_to_one`], the multiplicative identity.
    fn default() -> Self {
        Self { limbs: [0; LIMBS] }
    }
}

impl fmt::Debug for Num3072 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Num3072").field("limbs", &self.limbs).finish()
    }
}

impl Num3072 {
    /// Builds a `Num3072` from its little-endian limb representation.
    ///
    /// No normalization is performed: the result may represent a value
    /// `>= P`. This mirrors the type's redundant representation (see the
    /// module documentation) and matches how the surrounding MuHash
    /// accumulator constructs a `Num3072` from hash-expansion output before
    /// ever calling an operation on it.
    #[must_use]
    pub const fn from_limbs(limbs: [Limb; LIMBS]) -> Self {
        Self { limbs }
    }

    /// Returns the little-endian limb representation.
    #[must_use]
    pub const fn as_limbs(&self) -> &[Limb; LIMBS] {
        &self.limbs
    }

    /// Sets `self` to the multiplicative identity, `1`.
    pub fn set_to_one(&mut self) {
        self.limbs = [0; LIMBS];
        self.limbs[0] = 1;
    }

    /// Returns `true` iff the represented value is `>= P`.
    ///
    /// Because `P = 2^3072 - K`, this holds iff the high `LIMBS - 1` limbs
    /// are all `Limb::MAX` and `limbs[0] > Limb::MAX - K`. Scans from the
    /// low limb so a single non-max high limb short-circuits immediately.
    fn is_overflow(&self) -> bool {
        if self.limbs[0] <= Limb::MAX - K {
            return false;
        }
        self.limbs[1..].iter().all(|&limb| limb == Limb::MAX)
    }

    /// `self -= P (mod 2^3072)`.
    ///
    /// Implemented as `self += K`, since `P + K ≡ 0 (mod 2^3072)`. Only
    /// valid when [`Self::is_overflow`] holds; calling it on an
    /// already-canonical value silently over-subtracts by `P`. Kept
    /// private so that precondition cannot be violated from outside this
    /// module — every caller here checks `is_overflow` (or already knows a
    /// residual carry implies overflow) immediately before calling it.
    fn full_reduce(&mut self) {
        let mut acc = [K, 0];
        for limb in &mut self.limbs {
            *limb = addnextract2(&mut acc, *limb);
        }
    }

    /// Brings `self` back under `P`, given the residual top-of-range carry
    /// (`0` or `1`) that `multiply`/`square` left over from their second
    /// reduction pass. At most two [`Self::full_reduce`] calls are ever
    /// needed: `full_reduce` overcorrects by at most one `P`, so a value
    /// that was `< 2P` lands `< P` after one call and a value that was
    /// `< 2^3072` (hence `< 2P` once the residual carry is folded in) needs
    /// at most the carry's own pass plus one more.
    fn normalize(&mut self, residual_carry: Limb) {
        if self.is_overflow() {
            self.full_reduce();
        }
        if residual_carry == 1 {
            self.full_reduce();
        }
    }

    /// `self *= a (mod P)`.
    ///
    /// Computes the schoolbook product column by column. For output column
    /// `j`, the terms `this[i] * a[LIMBS + j - i]` for `i` in `(j, LIMBS)`
    /// would land at position `LIMBS + j`, i.e. at or above `2^3072`; since
    /// `2^3072 = P + K`, each such term is worth `K` times itself at column
    /// `j` instead. That upper-half column is folded in (multiplied by `K`)
    /// before the matching lower-half column `this[i] * a[j - i]` for `i` in
    /// `[0, j]` is added, so only [`LIMBS`] limbs of output are ever
    /// produced directly, plus a small residual handled by the second
    /// reduction pass below.
    pub fn multiply(&mut self, a: &Num3072) {
        // Running "carry-across-columns" accumulator: `K` times the upper
        // half's column sum, plus the lower half's column sum.
        let mut cross = [0 as Limb; 3];
        let mut tmp = [0 as Limb; LIMBS];

        for j in 0..LIMBS - 1 {
            let (low, high) = mul(self.limbs[j + 1], a.limbs[LIMBS - 1]);
            let mut upper = [low, high, 0];
            for i in (j + 2)..LIMBS {
                muladd3(&mut upper, self.limbs[i], a.limbs[LIMBS + j - i]);
            }

            mulnadd3(&mut cross, &upper, K);

            for i in 0..=j {
                muladd3(&mut cross, self.limbs[i], a.limbs[j - i]);
            }

            tmp[j] = extract3(&mut cross);
        }
        debug_assert_eq!(
            cross[2], 0,
            "K * (upper column) + lower column fits in two limbs"
        );

        // The "meeting" column, where upper and lower halves coincide.
        for i in 0..LIMBS {
            muladd3(&mut cross, self.limbs[i], a.limbs[LIMBS - 1 - i]);
        }
        tmp[LIMBS - 1] = extract3(&mut cross);

        // `[cross[0], cross[1]]` still represents bits above position 3072;
        // fold them back in with a second reduction pass.
        let mut residual = [cross[0], cross[1]];
        muln2(&mut residual, K);
        for (limb, t) in self.limbs.iter_mut().zip(tmp) {
            *limb = addnextract2(&mut residual, t);
        }
        debug_assert_eq!(residual[1], 0, "second reduction pass leaves no high limb");
        debug_assert!(residual[0] <= 1, "second reduction pass carries at most 1");

        self.normalize(residual[0]);
    }

    /// `self = self^2 (mod P)`.
    ///
    /// Structurally identical to [`Self::multiply`], but exploits
    /// `this[i] * this[k-i] == this[k-i] * this[i]` to fold each
    /// off-diagonal pair once via [`muldbladd3`] instead of twice via
    /// [`muladd3`]; a central term on a column of odd length (`this[m]^2`)
    /// is still folded in once via [`muladd3`].
    pub fn square(&mut self) {
        let mut acc = [0 as Limb; 3];
        let mut tmp = [0 as Limb; LIMBS];

        for j in 0..LIMBS - 1 {
            let mut upper = [0 as Limb; 3];
            let upper_pairs = (LIMBS - 1 - j) / 2;
            for i in 0..upper_pairs {
                muldbladd3(&mut upper, self.limbs[i + j + 1], self.limbs[LIMBS - 1 - i]);
            }
            if (j + 1) & 1 != 0 {
                muladd3(
                    &mut upper,
                    self.limbs[upper_pairs + j + 1],
                    self.limbs[LIMBS - 1 - upper_pairs],
                );
            }

            mulnadd3(&mut acc, &upper, K);

            let lower_pairs = (j + 1) / 2;
            for i in 0..lower_pairs {
                muldbladd3(&mut acc, self.limbs[i], self.limbs[j - i]);
            }
            if (j + 1) & 1 != 0 {
                muladd3(&mut acc, self.limbs[lower_pairs], self.limbs[j - lower_pairs]);
            }

            tmp[j] = extract3(&mut acc);
        }
        debug_assert_eq!(acc[2], 0, "K * (upper column) + lower column fits in two limbs");

        for i in 0..LIMBS / 2 {
            muldbladd3(&mut acc, self.limbs[i], self.limbs[LIMBS - 1 - i]);
        }
        tmp[LIMBS - 1] = extract3(&mut acc);

        let mut residual = [acc[0], acc[1]];
        muln2(&mut residual, K);
        for (limb, t) in self.limbs.iter_mut().zip(tmp) {
            *limb = addnextract2(&mut residual, t);
        }
        debug_assert_eq!(residual[1], 0, "second reduction pass leaves no high limb");
        debug_assert!(residual[0] <= 1, "second reduction pass carries at most 1");

        self.normalize(residual[0]);
    }

    /// Returns `self^-1 (mod P)` via Fermat's little theorem, `a^(P-2)`.
    ///
    /// Uses a repunit precomputation (`p[i] = a^(2^(2^i) - 1)`) and a fixed
    /// addition chain over it, following Brumley & Järvinen's windowed
    /// exponentiation. `self` is not mutated.
    ///
    /// # Meaningless results
    ///
    /// Does not panic on `self == 0`: it computes `0^(P-2) == 0`, a value
    /// that silently fails to act as an inverse under a later `multiply`.
    /// Callers must ensure `self != 0` (and not a multiple of `P`).
    #[must_use]
    pub fn get_inverse(&self) -> Num3072 {
        let mut p = [*self; 12];
        for i in 0..11 {
            let mut next = p[i];
            for _ in 0..(1usize << i) {
                next.square();
            }
            next.multiply(&p[i]);
            p[i + 1] = next;
        }

        let mut out = p[11];
        for &(squarings, index) in INVERSE_CHAIN {
            for _ in 0..squarings {
                out.square();
            }
            out.multiply(&p[index]);
        }
        out
    }

    /// `self *= a^-1 (mod P)`.
    pub fn divide(&mut self, a: &Num3072) {
        if self.is_overflow() {
            self.full_reduce();
        }

        let inv = if a.is_overflow() {
            let mut reduced = *a;
            reduced.full_reduce();
            reduced.get_inverse()
        } else {
            a.get_inverse()
        };

        self.multiply(&inv);

        if self.is_overflow() {
            self.full_reduce();
        }
    }
}

#[cfg(feature = "std")]
mod fmt_bridge {
    use core::fmt;

    use num_bigint::BigUint;

    use super::{Limb, Num3072};

    impl From<&Num3072> for BigUint {
        fn from(value: &Num3072) -> Self {
            let mut bytes = [0u8; super::LIMBS * (Limb::BITS as usize / 8)];
            for (chunk, limb) in
                bytes.chunks_exact_mut(Limb::BITS as usize / 8).zip(value.as_limbs())
            {
                chunk.copy_from_slice(&limb.to_le_bytes());
            }
            BigUint::from_bytes_le(&bytes)
        }
    }

    impl fmt::Display for Num3072 {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", BigUint::from(self))
        }
    }

    impl fmt::UpperHex for Num3072 {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:X}", BigUint::from(self))
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use num_bigint::BigUint;
    use proptest::prelude::*;

    use super::*;
    use crate::test_helpers::{any_num3072, nonzero_canonical_num3072};

    fn one() -> Num3072 {
        let mut x = Num3072::default();
        x.set_to_one();
        x
    }

    fn p() -> BigUint {
        (BigUint::from(1u32) << 3072u32) - BigUint::from(K)
    }

    fn to_biguint(x: &Num3072) -> BigUint {
        BigUint::from(x)
    }

    fn from_biguint(mut v: BigUint) -> Num3072 {
        v %= p();
        let bytes = v.to_bytes_le();
        let mut limbs = [0 as Limb; LIMBS];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            limbs[i] = Limb::from_le_bytes(buf);
        }
        Num3072::from_limbs(limbs)
    }

    #[test]
    fn set_to_one_then_square_ten_times_is_one() {
        let mut x = one();
        for _ in 0..10 {
            x.square();
        }
        assert_eq!(x, one());
    }

    #[test]
    fn squaring_p_minus_one_is_one() {
        let mut limbs = [Limb::MAX; LIMBS];
        limbs[0] = Limb::MAX - K;
        let mut x = Num3072::from_limbs(limbs);
        x.square();
        assert_eq!(x, one());
    }

    #[test]
    fn multiply_by_one_reduces_p_to_zero() {
        let mut limbs = [Limb::MAX; LIMBS];
        limbs[0] = Limb::MAX - K + 1;
        let mut x = Num3072::from_limbs(limbs);
        assert!(x.is_overflow());
        x.multiply(&one());
        assert_eq!(x, Num3072::default());
    }

    #[test]
    fn multiply_by_one_reduces_p_plus_five_to_five() {
        let mut limbs = [Limb::MAX; LIMBS];
        limbs[0] = Limb::MAX - K + 1 + 5;
        let mut x = Num3072::from_limbs(limbs);
        x.multiply(&one());
        let mut five = Num3072::default();
        five.limbs[0] = 5;
        assert_eq!(x, five);
    }

    #[test]
    fn division_round_trips_small_literal() {
        let mut seven = Num3072::default();
        seven.limbs[0] = 7;
        let mut three = Num3072::default();
        three.limbs[0] = 3;

        let mut quotient = seven;
        quotient.divide(&three);
        quotient.multiply(&three);
        assert_eq!(quotient, seven);
    }

    proptest! {
        #[test]
        fn multiply_matches_biguint_reference(
            x in any_num3072(),
            y in any_num3072(),
        ) {
            let expected = (to_biguint(&x) * to_biguint(&y)) % p();

            let mut got = x;
            got.multiply(&y);

            prop_assert!(!got.is_overflow());
            prop_assert_eq!(to_biguint(&got), expected);
        }

        #[test]
        fn square_equals_multiply_by_self(x in any_num3072()) {
            let mut via_square = x;
            via_square.square();

            let mut via_multiply = x;
            via_multiply.multiply(&x);

            prop_assert_eq!(via_square, via_multiply);
        }

        #[test]
        fn multiply_is_commutative(x in any_num3072(), y in any_num3072()) {
            let mut xy = x;
            xy.multiply(&y);

            let mut yx = y;
            yx.multiply(&x);

            prop_assert_eq!(xy, yx);
        }

        #[test]
        fn multiply_is_associative(
            x in any_num3072(),
            y in any_num3072(),
            z in any_num3072(),
        ) {
            let mut xy_z = x;
            xy_z.multiply(&y);
            xy_z.multiply(&z);

            let mut yz = y;
            yz.multiply(&z);
            let mut x_yz = x;
            x_yz.multiply(&yz);

            prop_assert_eq!(xy_z, x_yz);
        }

        #[test]
        fn multiply_by_one_is_identity(x in any_num3072()) {
            let expected = to_biguint(&x) % p();

            let mut got = x;
            got.multiply(&one());

            prop_assert_eq!(to_biguint(&got), expected);
        }

        #[test]
        fn inverse_then_multiply_is_one(x in nonzero_canonical_num3072()) {
            let inv = x.get_inverse();
            let mut product = x;
            product.multiply(&inv);
            prop_assert_eq!(product, one());
        }

        #[test]
        fn divide_then_multiply_round_trips(
            x in any_num3072(),
            a in nonzero_canonical_num3072(),
        ) {
            let expected = to_biguint(&x) % p();

            let mut got = x;
            got.divide(&a);
            got.multiply(&a);

            prop_assert_eq!(to_biguint(&got), expected);
        }

        #[test]
        fn operations_always_leave_a_canonical_result(
            x in any_num3072(),
            y in any_num3072(),
        ) {
            let mut product = x;
            product.multiply(&y);
            prop_assert!(!product.is_overflow());

            let mut squared = x;
            squared.square();
            prop_assert!(!squared.is_overflow());
        }
    }

    #[test]
    fn from_biguint_round_trips_through_multiply() {
        let v = BigUint::from(123_456_789_u64) * BigUint::from(987_654_321_u64);
        let x = from_biguint(v.clone());
        assert_eq!(to_biguint(&x), v % p());
    }
}
