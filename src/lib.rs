#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod arithmetic;
pub mod num3072;

#[cfg(all(test, feature = "std"))]
mod test_helpers;

pub use num3072::Num3072;
