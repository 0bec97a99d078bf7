//! Finite Hilbert space descriptor for visible configurations.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, NqsError};
use crate::rng::RngHandle;

/// Describes the space of visible configurations a machine is defined over.
///
/// A configuration is a vector of `size` local quantum numbers, each taken
/// from the fixed ordered set `local_states`. Quantum numbers are stored as
/// `f64` and compared exactly; every value flowing through the samplers is
/// drawn from `local_states`, so exact comparison is well defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hilbert {
    size: usize,
    local_states: Vec<f64>,
}

impl Hilbert {
    /// Creates a Hilbert space with `size` sites and the given local states.
    pub fn new(size: usize, local_states: Vec<f64>) -> Result<Self, NqsError> {
        if size == 0 {
            return Err(NqsError::Hilbert(ErrorInfo::new(
                "empty-space",
                "hilbert space must contain at least one site",
            )));
        }
        if local_states.len() < 2 {
            return Err(NqsError::Hilbert(
                ErrorInfo::new(
                    "degenerate-local-space",
                    "need at least two local states to sample",
                )
                .with_context("local_states", local_states.len().to_string()),
            ));
        }
        for (idx, window) in local_states.windows(2).enumerate() {
            if window[0] >= window[1] {
                return Err(NqsError::Hilbert(
                    ErrorInfo::new(
                        "unsorted-local-states",
                        "local states must be strictly increasing",
                    )
                    .with_context("position", idx.to_string()),
                ));
            }
        }
        Ok(Self { size, local_states })
    }

    /// Spin-1/2 space: local states `{-1, +1}`.
    pub fn spin_half(size: usize) -> Result<Self, NqsError> {
        Self::new(size, vec![-1.0, 1.0])
    }

    /// Number of sites.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of states available at each site.
    pub fn local_size(&self) -> usize {
        self.local_states.len()
    }

    /// Ordered local quantum numbers.
    pub fn local_states(&self) -> &[f64] {
        &self.local_states
    }

    /// Position of `value` within the local state set, if present.
    pub fn local_index(&self, value: f64) -> Option<usize> {
        self.local_states.iter().position(|&s| s == value)
    }

    /// Returns true when `config` has the right length and every entry is a
    /// valid local state.
    pub fn contains(&self, config: &[f64]) -> bool {
        config.len() == self.size && config.iter().all(|&v| self.local_index(v).is_some())
    }

    /// Validates a caller supplied configuration, reporting shape and domain
    /// mismatches as usage errors.
    pub fn check_config(&self, config: &[f64]) -> Result<(), NqsError> {
        if config.len() != self.size {
            return Err(NqsError::Hilbert(
                ErrorInfo::new("shape-mismatch", "configuration length does not match space")
                    .with_context("expected", self.size.to_string())
                    .with_context("actual", config.len().to_string()),
            ));
        }
        for (site, &value) in config.iter().enumerate() {
            if self.local_index(value).is_none() {
                return Err(NqsError::Hilbert(
                    ErrorInfo::new("invalid-local-state", "entry is not a valid local state")
                        .with_context("site", site.to_string())
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Draws a uniform random local state.
    pub fn random_local(&self, rng: &mut RngHandle) -> f64 {
        self.local_states[rng.next_index(self.local_states.len())]
    }

    /// Draws a uniform random configuration.
    pub fn random_config(&self, rng: &mut RngHandle) -> Vec<f64> {
        (0..self.size).map(|_| self.random_local(rng)).collect()
    }

    /// Total number of basis states, when representable in a `usize`.
    pub fn n_states(&self) -> Option<usize> {
        let mut total: usize = 1;
        for _ in 0..self.size {
            total = total.checked_mul(self.local_states.len())?;
        }
        Some(total)
    }

    /// Decodes a basis index into a configuration. Site 0 is the most
    /// significant digit of the mixed-radix encoding.
    pub fn state_at(&self, index: usize) -> Vec<f64> {
        let base = self.local_states.len();
        let mut digits = vec![0usize; self.size];
        let mut rest = index;
        for site in (0..self.size).rev() {
            digits[site] = rest % base;
            rest /= base;
        }
        digits
            .into_iter()
            .map(|digit| self.local_states[digit])
            .collect()
    }

    /// Encodes a configuration into its basis index.
    pub fn index_of(&self, config: &[f64]) -> Result<usize, NqsError> {
        self.check_config(config)?;
        let base = self.local_states.len();
        let mut index = 0usize;
        for &value in config {
            let digit = self
                .local_index(value)
                .ok_or_else(|| NqsError::Hilbert(ErrorInfo::new("invalid-local-state", "")))?;
            index = index * base + digit;
        }
        Ok(index)
    }
}
