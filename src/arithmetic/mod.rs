//! Limb-level building blocks for [`crate::num3072::Num3072`].

pub mod limb;
