use sha2::{Digest, Sha256};

use crate::lattice::Lattice;

/// Computes the canonical structural hash for the provided lattice.
///
/// The hash covers the site count and the sorted edge list, so two lattices
/// with the same structure hash identically regardless of the order edges
/// were supplied in.
pub fn canonical_hash(lattice: &Lattice) -> String {
    let mut hasher = Sha256::new();
    hasher.update((lattice.size() as u64).to_le_bytes());
    hasher.update((lattice.edges().len() as u64).to_le_bytes());
    for &(a, b) in lattice.edges() {
        hasher.update((a as u64).to_le_bytes());
        hasher.update((b as u64).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
