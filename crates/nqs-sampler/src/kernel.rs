//! Move kernel abstraction and the generic Metropolis driver.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Hilbert, Machine, NqsError, RngHandle};

use crate::determinism;
use crate::sampler::Sampler;

/// A proposed transition of the visible configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    /// Sites whose value changes.
    pub sites: Vec<usize>,
    /// New values at the changed sites, parallel to `sites`.
    pub values: Vec<f64>,
    /// Log proposal-probability correction `log(T(x'->x) / T(x->x'))`,
    /// zero for symmetric kernels.
    pub log_correction: f64,
}

impl Move {
    /// Symmetric move touching the given sites.
    pub fn symmetric(sites: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            sites,
            values,
            log_correction: 0.0,
        }
    }

    /// Move the driver is guaranteed to reject, used by kernels whose
    /// current configuration admits no transition. The step still counts
    /// toward the proposal total.
    pub fn rejected() -> Self {
        Self {
            sites: Vec::new(),
            values: Vec::new(),
            log_correction: f64::NEG_INFINITY,
        }
    }

    /// Whether the driver is guaranteed to reject this move.
    pub fn is_rejected(&self) -> bool {
        self.log_correction == f64::NEG_INFINITY
    }
}

/// Proposal strategy plugged into the Metropolis drivers.
///
/// A kernel is pure: it reads the current configuration and draws a
/// candidate move from the provided RNG. All chain state lives in the
/// driver, which lets one kernel serve both the single-chain and the
/// tempered driver.
pub trait MoveKernel {
    /// Stable kernel name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Draws a candidate move for the given configuration.
    fn propose(
        &self,
        visible: &[f64],
        hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError>;
}

/// Single-chain Metropolis-Hastings driver generic over the move kernel.
///
/// Each step draws a move from the kernel and accepts it with probability
/// `min(1, exp(2 * dlog|psi| + log_correction))`; the factor two turns the
/// machine's log-amplitude difference into a `|psi|^2` ratio. The cached
/// log value is updated incrementally on acceptance.
pub struct MetropolisSampler<'m, K> {
    machine: &'m dyn Machine,
    kernel: K,
    visible: Vec<f64>,
    log_psi: f64,
    sweep_size: usize,
    accepted: u64,
    proposed: u64,
    rng: RngHandle,
}

impl<'m, K: MoveKernel> MetropolisSampler<'m, K> {
    /// Builds a sampler bound to `machine`, starting from a random
    /// configuration drawn from the derived chain substream of `seed`.
    pub fn new(machine: &'m dyn Machine, kernel: K, seed: u64) -> Result<Self, NqsError> {
        let mut rng = RngHandle::from_seed(determinism::chain_seed(seed, 0));
        let visible = machine.hilbert().random_config(&mut rng);
        let log_psi = machine.log_val(&visible)?;
        Ok(Self {
            machine,
            kernel,
            visible,
            log_psi,
            sweep_size: machine.n_visible(),
            accepted: 0,
            proposed: 0,
            rng,
        })
    }

    /// Overrides the number of proposal steps per sweep (default
    /// `n_visible`).
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

    /// The kernel driving this chain.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// The machine the chain samples from.
    pub fn machine(&self) -> &'m dyn Machine {
        self.machine
    }

    fn step(&mut self) -> Result<(), NqsError> {
        let candidate = self
            .kernel
            .propose(&self.visible, self.machine.hilbert(), &mut self.rng)?;
        self.proposed += 1;
        let diff =
            self.machine
                .log_val_diff(&self.visible, &candidate.sites, &candidate.values)?;
        let log_ratio = 2.0 * diff + candidate.log_correction;
        if log_ratio >= 0.0 || self.rng.next_unit() < log_ratio.exp() {
            for (&site, &value) in candidate.sites.iter().zip(candidate.values.iter()) {
                self.visible[site] = value;
            }
            self.log_psi += diff;
            self.accepted += 1;
        }
        Ok(())
    }
}

impl<K: MoveKernel> Sampler for MetropolisSampler<'_, K> {
    fn reset(&mut self) -> Result<(), NqsError> {
        self.visible = self.machine.hilbert().random_config(&mut self.rng);
        self.log_psi = self.machine.log_val(&self.visible)?;
        self.accepted = 0;
        self.proposed = 0;
        Ok(())
    }

    fn sweep(&mut self) -> Result<(), NqsError> {
        for _ in 0..self.sweep_size {
            self.step()?;
        }
        Ok(())
    }

    fn visible(&self) -> &[f64] {
        &self.visible
    }

    fn set_visible(&mut self, config: &[f64]) -> Result<(), NqsError> {
        self.machine.hilbert().check_config(config)?;
        let log_psi = self.machine.log_val(config)?;
        self.visible.clear();
        self.visible.extend_from_slice(config);
        self.log_psi = log_psi;
        Ok(())
    }

    fn acceptance(&self) -> Vec<f64> {
        if self.proposed == 0 {
            vec![0.0]
        } else {
            vec![self.accepted as f64 / self.proposed as f64]
        }
    }
}
