//! Distance-bounded hop proposals.

use nqs_core::{Hilbert, NqsError, RngHandle};
use nqs_graph::Lattice;

use crate::kernel::{Move, MoveKernel};
use crate::moves_exchange::clusters_within;

/// Hops a quantum number from a source site to a destination within a
/// maximum graph distance.
///
/// The destination takes over the source's value and the source is redrawn
/// uniformly from the local states. Unlike [`crate::moves_exchange`] this
/// does not conserve global sums. Source and destination are picked
/// uniformly over ordered pairs and the redraw is uniform, making the
/// transition matrix symmetric.
#[derive(Debug, Clone)]
pub struct HopKernel {
    // Ordered pairs: both orientations of every cluster.
    clusters: Vec<(usize, usize)>,
}

impl HopKernel {
    /// Builds the ordered cluster set from the lattice.
    pub fn new(lattice: &Lattice, n_visible: usize, d_max: usize) -> Result<Self, NqsError> {
        let unordered = clusters_within(lattice, n_visible, d_max)?;
        let mut clusters = Vec::with_capacity(unordered.len() * 2);
        for (a, b) in unordered {
            clusters.push((a, b));
            clusters.push((b, a));
        }
        Ok(Self { clusters })
    }

    /// Ordered site pairs the kernel draws from.
    pub fn clusters(&self) -> &[(usize, usize)] {
        &self.clusters
    }
}

impl MoveKernel for HopKernel {
    fn name(&self) -> &'static str {
        "hop"
    }

    fn propose(
        &self,
        visible: &[f64],
        hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError> {
        let (source, destination) = self.clusters[rng.next_index(self.clusters.len())];
        let carried = visible[source];
        let redrawn = hilbert.random_local(rng);
        Ok(Move::symmetric(
            vec![destination, source],
            vec![carried, redrawn],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_receives_source_value() {
        let lattice = Lattice::chain(5, true).unwrap();
        let hilbert = Hilbert::new(5, vec![-1.0, 0.0, 1.0]).unwrap();
        let kernel = HopKernel::new(&lattice, 5, 2).unwrap();
        let visible = [1.0, 0.0, -1.0, 0.0, 1.0];
        let mut rng = RngHandle::from_seed(17);
        for _ in 0..32 {
            let mv = kernel.propose(&visible, &hilbert, &mut rng).unwrap();
            let destination = mv.sites[0];
            let source = mv.sites[1];
            assert_eq!(mv.values[0], visible[source]);
            assert!(hilbert.local_index(mv.values[1]).is_some());
            assert_ne!(source, destination);
        }
    }

    #[test]
    fn clusters_cover_both_orientations() {
        let lattice = Lattice::chain(3, false).unwrap();
        let kernel = HopKernel::new(&lattice, 3, 1).unwrap();
        assert_eq!(kernel.clusters().len(), 4);
        assert!(kernel.clusters().contains(&(0, 1)));
        assert!(kernel.clusters().contains(&(1, 0)));
    }
}
