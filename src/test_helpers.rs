//! Shared `proptest` strategies for exercising [`crate::num3072::Num3072`].

use proptest::prelude::*;

use crate::{
    arithmetic::limb::Limb,
    num3072::{Num3072, LIMBS},
};

/// A strategy producing any representable value, `0 <= V < 2^3072`,
/// including values `>= P` that [`Num3072::multiply`]/[`Num3072::square`]
/// must still reduce correctly down to the canonical residue.
pub(crate) fn any_num3072() -> impl Strategy<Value = Num3072> {
    proptest::collection::vec(any::<Limb>(), LIMBS).prop_map(|v| {
        let mut limbs = [0 as Limb; LIMBS];
        limbs.copy_from_slice(&v);
        Num3072::from_limbs(limbs)
    })
}

/// A strategy producing a non-zero, canonical (`V < P`) value, derived by
/// normalizing a uniformly random representable value and falling back to
/// `1` in the vanishingly unlikely case it normalized to zero.
pub(crate) fn nonzero_canonical_num3072() -> impl Strategy<Value = Num3072> {
    any_num3072().prop_map(|mut x| {
        x.multiply(&one());
        if x.as_limbs() == &[0 as Limb; LIMBS] {
            x.set_to_one();
        }
        x
    })
}

fn one() -> Num3072 {
    let mut x = Num3072::default();
    x.set_to_one();
    x
}
