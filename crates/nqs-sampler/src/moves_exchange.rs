//! Distance-bounded pair-exchange proposals.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Hilbert, NqsError, RngHandle};
use nqs_graph::Lattice;

use crate::kernel::{Move, MoveKernel};

/// Swaps the values of two sites within a maximum graph distance.
///
/// The cluster set (all unordered site pairs with shortest-path distance at
/// most `d_max`) is computed once at construction. Exchanges permute the
/// local quantum numbers, so global sums over the configuration are
/// conserved; use this kernel only when sampling inside a fixed-total
/// sector, otherwise the chain is not ergodic.
#[derive(Debug, Clone)]
pub struct ExchangeKernel {
    clusters: Vec<(usize, usize)>,
}

impl ExchangeKernel {
    /// Builds the cluster set from the lattice, validating it against the
    /// machine's visible size.
    pub fn new(lattice: &Lattice, n_visible: usize, d_max: usize) -> Result<Self, NqsError> {
        let clusters = clusters_within(lattice, n_visible, d_max)?;
        Ok(Self { clusters })
    }

    /// Site pairs the kernel draws from.
    pub fn clusters(&self) -> &[(usize, usize)] {
        &self.clusters
    }
}

impl MoveKernel for ExchangeKernel {
    fn name(&self) -> &'static str {
        "exchange"
    }

    fn propose(
        &self,
        visible: &[f64],
        _hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError> {
        let (a, b) = self.clusters[rng.next_index(self.clusters.len())];
        Ok(Move::symmetric(vec![a, b], vec![visible[b], visible[a]]))
    }
}

/// Shared cluster construction for the exchange and hop kernels.
pub(crate) fn clusters_within(
    lattice: &Lattice,
    n_visible: usize,
    d_max: usize,
) -> Result<Vec<(usize, usize)>, NqsError> {
    if lattice.size() != n_visible {
        return Err(NqsError::Sampler(
            ErrorInfo::new("size-mismatch", "lattice and machine disagree on site count")
                .with_context("lattice", lattice.size().to_string())
                .with_context("machine", n_visible.to_string()),
        ));
    }
    if d_max == 0 {
        return Err(NqsError::Sampler(ErrorInfo::new(
            "bad-distance-bound",
            "maximum distance must be at least one",
        )));
    }
    let clusters = lattice.clusters_within(d_max);
    if clusters.is_empty() {
        return Err(NqsError::Sampler(
            ErrorInfo::new("no-clusters", "no site pair within the distance bound")
                .with_context("d_max", d_max.to_string())
                .with_hint("check that the lattice has edges"),
        ));
    }
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_conserves_values() {
        let lattice = Lattice::chain(4, false).unwrap();
        let hilbert = Hilbert::spin_half(4).unwrap();
        let kernel = ExchangeKernel::new(&lattice, 4, 1).unwrap();
        let visible = [1.0, -1.0, -1.0, 1.0];
        let mut rng = RngHandle::from_seed(2);
        for _ in 0..32 {
            let mv = kernel.propose(&visible, &hilbert, &mut rng).unwrap();
            let (a, b) = (mv.sites[0], mv.sites[1]);
            assert_eq!(mv.values, vec![visible[b], visible[a]]);
        }
    }

    #[test]
    fn construction_validates_inputs() {
        let lattice = Lattice::chain(4, false).unwrap();
        assert_eq!(
            ExchangeKernel::new(&lattice, 5, 1).unwrap_err().info().code,
            "size-mismatch"
        );
        assert_eq!(
            ExchangeKernel::new(&lattice, 4, 0).unwrap_err().info().code,
            "bad-distance-bound"
        );
        let isolated = Lattice::from_edges(3, &[]).unwrap();
        assert_eq!(
            ExchangeKernel::new(&isolated, 3, 2).unwrap_err().info().code,
            "no-clusters"
        );
    }
}
