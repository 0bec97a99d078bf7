#![deny(missing_docs)]

//! Undirected site lattices backing the lattice-aware sampler kernels.

mod hash;
mod lattice;

pub use hash::canonical_hash;
pub use lattice::{lattice_from_json, lattice_to_json, Lattice};
