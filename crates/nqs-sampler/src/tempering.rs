//! Parallel tempering driver shared by all `*-pt` variants.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Machine, NqsError, RngHandle};

use crate::determinism;
use crate::kernel::MoveKernel;
use crate::sampler::Sampler;

/// Computes the Metropolis acceptance for exchanging two replicas sampling
/// `|psi|^(2 beta)` at different inverse temperatures.
pub fn exchange_acceptance(log_psi_a: f64, beta_a: f64, log_psi_b: f64, beta_b: f64) -> f64 {
    let log_ratio = 2.0 * (beta_a - beta_b) * (log_psi_b - log_psi_a);
    log_ratio.exp().min(1.0)
}

/// Attempts a replica exchange using the provided RNG handle, returning the
/// decision and the acceptance probability.
pub fn attempt_exchange(
    log_psi_a: f64,
    beta_a: f64,
    log_psi_b: f64,
    beta_b: f64,
    rng: &mut RngHandle,
) -> (bool, f64) {
    let acceptance = exchange_acceptance(log_psi_a, beta_a, log_psi_b, beta_b);
    (rng.next_unit() < acceptance, acceptance)
}

/// Linear inverse-temperature ladder `beta_r = 1 - r / n_replicas`.
pub fn beta_ladder(n_replicas: usize) -> Vec<f64> {
    (0..n_replicas)
        .map(|replica| 1.0 - replica as f64 / n_replicas as f64)
        .collect()
}

struct Replica {
    beta: f64,
    visible: Vec<f64>,
    log_psi: f64,
    accepted: u64,
    proposed: u64,
    rng: RngHandle,
}

/// Parallel-tempering Metropolis driver generic over the move kernel.
///
/// Runs `n_replicas` chains of the same kernel at inverse temperatures from
/// [`beta_ladder`], each on its own deterministic substream. A sweep first
/// advances every replica (acceptance `min(1, exp(2 beta dlog|psi| +
/// corr))`), then walks adjacent ladder slots attempting configuration
/// exchanges. Slot 0 always holds the cold `beta = 1` chain, which is what
/// `visible`/`set_visible` address.
pub struct TemperedSampler<'m, K> {
    machine: &'m dyn Machine,
    kernel: K,
    replicas: Vec<Replica>,
    sweep_size: usize,
    exchange_rng: RngHandle,
}

impl<'m, K: MoveKernel> TemperedSampler<'m, K> {
    /// Builds a ladder of `n_replicas` chains bound to `machine`.
    pub fn new(
        machine: &'m dyn Machine,
        kernel: K,
        n_replicas: usize,
        seed: u64,
    ) -> Result<Self, NqsError> {
        if n_replicas == 0 {
            return Err(NqsError::Sampler(
                ErrorInfo::new("empty-ladder", "parallel tempering needs at least one replica")
                    .with_hint("use n_replicas >= 1"),
            ));
        }
        let mut replicas = Vec::with_capacity(n_replicas);
        for (index, beta) in beta_ladder(n_replicas).into_iter().enumerate() {
            let mut rng = RngHandle::from_seed(determinism::chain_seed(seed, index));
            let visible = machine.hilbert().random_config(&mut rng);
            let log_psi = machine.log_val(&visible)?;
            replicas.push(Replica {
                beta,
                visible,
                log_psi,
                accepted: 0,
                proposed: 0,
                rng,
            });
        }
        Ok(Self {
            machine,
            kernel,
            replicas,
            sweep_size: machine.n_visible(),
            exchange_rng: RngHandle::from_seed(determinism::exchange_seed(seed)),
        })
    }

    /// Overrides the number of proposal steps per replica per sweep.
    pub fn set_sweep_size(&mut self, sweep_size: usize) -> Result<(), NqsError> {
        if sweep_size == 0 {
            return Err(NqsError::Sampler(ErrorInfo::new(
                "empty-sweep",
                "sweep size must be at least one step",
            )));
        }
        self.sweep_size = sweep_size;
        Ok(())
    }

    /// Number of replicas in the ladder.
    pub fn n_replicas(&self) -> usize {
        self.replicas.len()
    }

    /// Inverse temperatures of the ladder slots.
    pub fn betas(&self) -> Vec<f64> {
        self.replicas.iter().map(|replica| replica.beta).collect()
    }

    fn step_replica(&mut self, slot: usize) -> Result<(), NqsError> {
        let replica = &mut self.replicas[slot];
        let candidate = self
            .kernel
            .propose(&replica.visible, self.machine.hilbert(), &mut replica.rng)?;
        replica.proposed += 1;
        let diff =
            self.machine
                .log_val_diff(&replica.visible, &candidate.sites, &candidate.values)?;
        let log_ratio = 2.0 * replica.beta * diff + candidate.log_correction;
        if log_ratio >= 0.0 || replica.rng.next_unit() < log_ratio.exp() {
            for (&site, &value) in candidate.sites.iter().zip(candidate.values.iter()) {
                replica.visible[site] = value;
            }
            replica.log_psi += diff;
            replica.accepted += 1;
        }
        Ok(())
    }

    fn exchange_pass(&mut self) {
        for pair in 0..self.replicas.len().saturating_sub(1) {
            let (accept, _prob) = attempt_exchange(
                self.replicas[pair].log_psi,
                self.replicas[pair].beta,
                self.replicas[pair + 1].log_psi,
                self.replicas[pair + 1].beta,
                &mut self.exchange_rng,
            );
            if accept {
                // Configurations travel the ladder; betas stay with slots.
                let (left, right) = self.replicas.split_at_mut(pair + 1);
                std::mem::swap(&mut left[pair].visible, &mut right[0].visible);
                std::mem::swap(&mut left[pair].log_psi, &mut right[0].log_psi);
            }
        }
    }
}

impl<K: MoveKernel> Sampler for TemperedSampler<'_, K> {
    fn reset(&mut self) -> Result<(), NqsError> {
        for replica in &mut self.replicas {
            replica.visible = self.machine.hilbert().random_config(&mut replica.rng);
            replica.log_psi = self.machine.log_val(&replica.visible)?;
            replica.accepted = 0;
            replica.proposed = 0;
        }
        Ok(())
    }

    fn sweep(&mut self) -> Result<(), NqsError> {
        for slot in 0..self.replicas.len() {
            for _ in 0..self.sweep_size {
                self.step_replica(slot)?;
            }
        }
        self.exchange_pass();
        Ok(())
    }

    fn visible(&self) -> &[f64] {
        &self.replicas[0].visible
    }

    fn set_visible(&mut self, config: &[f64]) -> Result<(), NqsError> {
        self.machine.hilbert().check_config(config)?;
        let log_psi = self.machine.log_val(config)?;
        let cold = &mut self.replicas[0];
        cold.visible.clear();
        cold.visible.extend_from_slice(config);
        cold.log_psi = log_psi;
        Ok(())
    }

    fn acceptance(&self) -> Vec<f64> {
        self.replicas
            .iter()
            .map(|replica| {
                if replica.proposed == 0 {
                    0.0
                } else {
                    replica.accepted as f64 / replica.proposed as f64
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_linear_and_cold_first() {
        let betas = beta_ladder(4);
        assert_eq!(betas, vec![1.0, 0.75, 0.5, 0.25]);
        assert_eq!(beta_ladder(1), vec![1.0]);
    }

    #[test]
    fn equal_temperatures_always_exchange() {
        assert_eq!(exchange_acceptance(3.0, 0.5, -1.0, 0.5), 1.0);
    }

    #[test]
    fn acceptance_matches_reported_probability() {
        let acceptance = exchange_acceptance(0.2, 1.0, -0.4, 0.5);
        let mut rng = RngHandle::from_seed(0xDEADBEEF);
        let (_accepted, prob) = attempt_exchange(0.2, 1.0, -0.4, 0.5, &mut rng);
        assert!((prob - acceptance).abs() < 1e-12);
    }
}
