#![deny(missing_docs)]

//! Machine implementations of the `nqs-core` [`nqs_core::Machine`] trait.

mod rbm;

pub use rbm::RbmSpin;
