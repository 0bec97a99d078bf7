#![deny(missing_docs)]
#![doc = "Core traits and data types for the nqs sampler engine."]

pub mod errors;
pub mod hilbert;
pub mod rng;

pub use errors::{ErrorInfo, NqsError};
pub use hilbert::Hilbert;
pub use rng::{derive_substream_seed, RngHandle};

/// Capability contract for the parameterized model being sampled.
///
/// A machine evaluates a wavefunction-like function over visible
/// configurations drawn from its [`Hilbert`] space. Samplers hold a
/// non-owning reference to a machine for their whole lifetime and only ever
/// read from it; the caller keeps ownership and must keep the machine alive
/// while any sampler is bound to it.
pub trait Machine: Send + Sync {
    /// The configuration space this machine is defined over.
    fn hilbert(&self) -> &Hilbert;

    /// Number of visible units (sites).
    fn n_visible(&self) -> usize {
        self.hilbert().size()
    }

    /// Number of variational parameters held by the machine.
    fn n_parameters(&self) -> usize;

    /// Log-amplitude `log|psi(config)|` of the machine on a configuration.
    fn log_val(&self, config: &[f64]) -> Result<f64, NqsError>;

    /// Log-amplitude change under a partial update: the value of
    /// `log|psi(config')| - log|psi(config)|` where `config'` equals
    /// `config` with `values[k]` written at `sites[k]`.
    ///
    /// The default recomputes from scratch; machines with product structure
    /// should override it with an incremental evaluation.
    fn log_val_diff(
        &self,
        config: &[f64],
        sites: &[usize],
        values: &[f64],
    ) -> Result<f64, NqsError> {
        let mut updated = config.to_vec();
        for (&site, &value) in sites.iter().zip(values.iter()) {
            if site >= updated.len() {
                return Err(NqsError::Machine(
                    ErrorInfo::new("site-out-of-range", "update touches a site beyond n_visible")
                        .with_context("site", site.to_string())
                        .with_context("n_visible", updated.len().to_string()),
                ));
            }
            updated[site] = value;
        }
        Ok(self.log_val(&updated)? - self.log_val(config)?)
    }
}
