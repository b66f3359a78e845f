//! Platform-agnostic types shared by the accessors.

pub mod address;
pub mod scalar;

pub use address::Address;
pub use scalar::{Scalar, ScalarKind};
