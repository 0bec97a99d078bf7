//! The uniform sampler capability trait.

use nqs_core::NqsError;

/// Abstract Markov-chain sampler over visible configurations.
///
/// Every concrete sampling strategy satisfies this interface after
/// construction; callers are variant-agnostic from then on. The five
/// operations may be invoked in any order, repeatedly. None of them mutate
/// the machine, graph, or operator the sampler was bound to, and a sampler
/// instance must not be shared across threads without external
/// serialization.
pub trait Sampler {
    /// Reinitializes the chain to a valid random starting configuration and
    /// zeroes the acceptance accumulators. Leaves the sampler ready for
    /// [`Sampler::sweep`].
    fn reset(&mut self) -> Result<(), NqsError>;

    /// Advances the chain by one batch of propose/accept-reject steps,
    /// mutating the internal state and the acceptance accumulators.
    fn sweep(&mut self) -> Result<(), NqsError>;

    /// Current visible configuration, without mutating state.
    fn visible(&self) -> &[f64];

    /// Overwrites the current configuration with a caller supplied value.
    ///
    /// The configuration is validated against the bound machine's Hilbert
    /// space; on shape or domain mismatch the call fails without mutating
    /// internal state.
    fn set_visible(&mut self, config: &[f64]) -> Result<(), NqsError>;

    /// Running acceptance statistics accumulated since the last reset, one
    /// entry per chain (replica). With no proposals taken yet the statistic
    /// is neutral.
    fn acceptance(&self) -> Vec<f64>;
}

impl std::fmt::Debug for dyn Sampler + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Sampler")
    }
}
