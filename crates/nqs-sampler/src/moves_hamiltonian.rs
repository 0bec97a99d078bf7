//! Hamiltonian-guided move proposals.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Hilbert, NqsError, RngHandle};
use nqs_operator::LocalOperator;

use crate::kernel::{Move, MoveKernel};

/// Proposes transitions along the off-diagonal connections of an operator.
///
/// A candidate is drawn uniformly among the configurations connected to the
/// current one through the Hamiltonian. The proposal is not symmetric: the
/// correction is `log(n_conn(x) / n_conn(x'))`, the ratio of connection
/// counts before and after the move. Configurations with no connections, or
/// whose candidate has none back, yield an always-rejected proposal instead
/// of an error.
#[derive(Debug)]
pub struct HamiltonianKernel<'op> {
    operator: &'op LocalOperator,
}

impl<'op> HamiltonianKernel<'op> {
    /// Binds the kernel to a Hamiltonian, validating the site count.
    pub fn new(operator: &'op LocalOperator, n_visible: usize) -> Result<Self, NqsError> {
        if operator.hilbert().size() != n_visible {
            return Err(NqsError::Sampler(
                ErrorInfo::new(
                    "size-mismatch",
                    "hamiltonian and machine disagree on site count",
                )
                .with_context("hamiltonian", operator.hilbert().size().to_string())
                .with_context("machine", n_visible.to_string()),
            ));
        }
        if operator.n_terms() == 0 {
            return Err(NqsError::Sampler(ErrorInfo::new(
                "empty-hamiltonian",
                "hamiltonian has no terms to propose moves from",
            )));
        }
        Ok(Self { operator })
    }

    /// The operator guiding the proposals.
    pub fn operator(&self) -> &'op LocalOperator {
        self.operator
    }

    fn off_diagonal_count(&self, config: &[f64]) -> Result<usize, NqsError> {
        Ok(self
            .operator
            .find_conn(config)?
            .iter()
            .filter(|connection| !connection.sites.is_empty())
            .count())
    }
}

impl MoveKernel for HamiltonianKernel<'_> {
    fn name(&self) -> &'static str {
        "hamiltonian"
    }

    fn propose(
        &self,
        visible: &[f64],
        _hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError> {
        let connections = self.operator.find_conn(visible)?;
        let off_diagonal: Vec<_> = connections
            .into_iter()
            .filter(|connection| !connection.sites.is_empty())
            .collect();
        if off_diagonal.is_empty() {
            // Nothing to hop to; the step counts as a rejected proposal.
            return Ok(Move::rejected());
        }
        let chosen = &off_diagonal[rng.next_index(off_diagonal.len())];

        let mut candidate = visible.to_vec();
        for (&site, &value) in chosen.sites.iter().zip(chosen.values.iter()) {
            candidate[site] = value;
        }
        let forward = off_diagonal.len();
        let reverse = self.off_diagonal_count(&candidate)?;
        if reverse == 0 {
            // No way back means zero reverse probability; always reject.
            return Ok(Move::rejected());
        }
        Ok(Move {
            sites: chosen.sites.clone(),
            values: chosen.values.clone(),
            log_correction: (forward as f64 / reverse as f64).ln(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nqs_graph::Lattice;

    fn ising(sites: usize, h: f64) -> LocalOperator {
        let hilbert = Hilbert::spin_half(sites).unwrap();
        let lattice = Lattice::chain(sites, false).unwrap();
        LocalOperator::ising(hilbert, &lattice, h, 1.0).unwrap()
    }

    #[test]
    fn proposals_follow_operator_connections() {
        let operator = ising(3, 0.7);
        let hilbert = Hilbert::spin_half(3).unwrap();
        let kernel = HamiltonianKernel::new(&operator, 3).unwrap();
        let visible = [1.0, -1.0, 1.0];
        let mut rng = RngHandle::from_seed(29);
        for _ in 0..16 {
            let mv = kernel.propose(&visible, &hilbert, &mut rng).unwrap();
            // Transverse-field terms connect through single spin flips, and
            // the connection count is site-independent here, so the
            // correction vanishes.
            assert_eq!(mv.sites.len(), 1);
            assert_eq!(mv.values[0], -visible[mv.sites[0]]);
            assert_eq!(mv.log_correction, 0.0);
        }
    }

    #[test]
    fn construction_validates_operator() {
        let operator = ising(3, 0.7);
        assert_eq!(
            HamiltonianKernel::new(&operator, 4)
                .unwrap_err()
                .info()
                .code,
            "size-mismatch"
        );
        let empty = LocalOperator::new(Hilbert::spin_half(3).unwrap());
        assert_eq!(
            HamiltonianKernel::new(&empty, 3).unwrap_err().info().code,
            "empty-hamiltonian"
        );
    }

    #[test]
    fn diagonal_only_operator_always_rejects() {
        let hilbert = Hilbert::spin_half(2).unwrap();
        let lattice = Lattice::chain(2, false).unwrap();
        // h = 0 leaves only zz diagonal terms.
        let operator = LocalOperator::ising(hilbert.clone(), &lattice, 0.0, 1.0).unwrap();
        let kernel = HamiltonianKernel::new(&operator, 2).unwrap();
        let mut rng = RngHandle::from_seed(5);
        let mv = kernel.propose(&[1.0, 1.0], &hilbert, &mut rng).unwrap();
        assert!(mv.is_rejected());
        assert!(mv.sites.is_empty());
    }
}
