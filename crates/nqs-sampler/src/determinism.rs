use nqs_core::derive_substream_seed;

/// Derives the deterministic seed for a specific chain (replica).
pub fn chain_seed(master_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(master_seed, chain_index as u64)
}

/// Derives the deterministic seed for replica-exchange decisions. The
/// stream is disjoint from every chain substream.
pub fn exchange_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, 0)
}
