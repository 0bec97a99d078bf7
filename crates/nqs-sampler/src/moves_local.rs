//! Single-site local move proposals.

use nqs_core::{Hilbert, NqsError, RngHandle};

use crate::kernel::{Move, MoveKernel};

/// Flips one uniformly chosen site to a different local state.
///
/// The transition matrix is symmetric (uniform over site and target state),
/// so no proposal correction is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKernel;

impl LocalKernel {
    /// Creates the kernel.
    pub fn new() -> Self {
        Self
    }
}

impl MoveKernel for LocalKernel {
    fn name(&self) -> &'static str {
        "local"
    }

    fn propose(
        &self,
        visible: &[f64],
        hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError> {
        let site = rng.next_index(hilbert.size());
        let states = hilbert.local_states();
        let current = hilbert.local_index(visible[site]).unwrap_or(0);
        // Draw among the other local states, skipping the current one.
        let mut pick = rng.next_index(states.len() - 1);
        if pick >= current {
            pick += 1;
        }
        Ok(Move::symmetric(vec![site], vec![states[pick]]))
    }
}
