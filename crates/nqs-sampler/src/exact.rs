//! Direct sampling from the exact `|psi|^2` distribution.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Machine, NqsError, RngHandle};

use crate::determinism;
use crate::sampler::Sampler;

/// Largest basis the exact sampler is willing to enumerate.
const MAX_STATES: usize = 1 << 24;

/// Enumerates the full basis and draws independent samples by CDF
/// inversion.
///
/// Construction fails when the basis is not enumerable. Samples are
/// independent, so the acceptance statistic is the constant `1.0`.
pub struct ExactSampler<'m> {
    machine: &'m dyn Machine,
    cumulative: Vec<f64>,
    visible: Vec<f64>,
    rng: RngHandle,
}

impl<'m> ExactSampler<'m> {
    /// Builds the sampler, enumerating the machine's basis once.
    pub fn new(machine: &'m dyn Machine, seed: u64) -> Result<Self, NqsError> {
        let n_states = machine.hilbert().n_states().ok_or_else(|| {
            NqsError::Sampler(ErrorInfo::new(
                "space-not-enumerable",
                "basis size overflows usize",
            ))
        })?;
        if n_states > MAX_STATES {
            return Err(NqsError::Sampler(
                ErrorInfo::new("space-too-large", "basis too large for exact sampling")
                    .with_context("n_states", n_states.to_string())
                    .with_context("limit", MAX_STATES.to_string()),
            ));
        }
        let cumulative = build_cumulative(machine, n_states)?;
        let mut rng = RngHandle::from_seed(determinism::chain_seed(seed, 0));
        let visible = draw_state(machine, &cumulative, &mut rng);
        Ok(Self {
            machine,
            cumulative,
            visible,
            rng,
        })
    }

    /// Number of basis states in the distribution.
    pub fn n_states(&self) -> usize {
        self.cumulative.len()
    }
}

fn build_cumulative(machine: &dyn Machine, n_states: usize) -> Result<Vec<f64>, NqsError> {
    let hilbert = machine.hilbert();
    let mut log_weights = Vec::with_capacity(n_states);
    let mut max_log = f64::NEG_INFINITY;
    for index in 0..n_states {
        let state = hilbert.state_at(index);
        let log_weight = 2.0 * machine.log_val(&state)?;
        max_log = max_log.max(log_weight);
        log_weights.push(log_weight);
    }
    if !max_log.is_finite() {
        return Err(NqsError::Sampler(ErrorInfo::new(
            "degenerate-distribution",
            "machine vanishes on the whole basis",
        )));
    }
    let mut cumulative = Vec::with_capacity(n_states);
    let mut total = 0.0;
    for log_weight in log_weights {
        total += (log_weight - max_log).exp();
        cumulative.push(total);
    }
    Ok(cumulative)
}

fn draw_state(machine: &dyn Machine, cumulative: &[f64], rng: &mut RngHandle) -> Vec<f64> {
    let total = *cumulative.last().unwrap_or(&1.0);
    let draw = rng.next_unit() * total;
    let index = cumulative.partition_point(|&mass| mass <= draw);
    machine
        .hilbert()
        .state_at(index.min(cumulative.len() - 1))
}

impl Sampler for ExactSampler<'_> {
    fn reset(&mut self) -> Result<(), NqsError> {
        self.visible = draw_state(self.machine, &self.cumulative, &mut self.rng);
        Ok(())
    }

    fn sweep(&mut self) -> Result<(), NqsError> {
        self.visible = draw_state(self.machine, &self.cumulative, &mut self.rng);
        Ok(())
    }

    fn visible(&self) -> &[f64] {
        &self.visible
    }

    fn set_visible(&mut self, config: &[f64]) -> Result<(), NqsError> {
        self.machine.hilbert().check_config(config)?;
        self.visible.clear();
        self.visible.extend_from_slice(config);
        Ok(())
    }

    fn acceptance(&self) -> Vec<f64> {
        vec![1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nqs_core::Hilbert;

    /// Machine concentrating all weight on the all-up configuration.
    struct PeakedMachine {
        hilbert: Hilbert,
    }

    impl Machine for PeakedMachine {
        fn hilbert(&self) -> &Hilbert {
            &self.hilbert
        }

        fn n_parameters(&self) -> usize {
            0
        }

        fn log_val(&self, config: &[f64]) -> Result<f64, NqsError> {
            self.hilbert.check_config(config)?;
            let ups = config.iter().filter(|&&v| v > 0.0).count();
            Ok(10.0 * ups as f64)
        }
    }

    #[test]
    fn sampling_concentrates_on_the_peak() {
        let machine = PeakedMachine {
            hilbert: Hilbert::spin_half(4).unwrap(),
        };
        let mut sampler = ExactSampler::new(&machine, 7).unwrap();
        sampler.reset().unwrap();
        for _ in 0..16 {
            sampler.sweep().unwrap();
            assert_eq!(sampler.visible(), &[1.0, 1.0, 1.0, 1.0]);
        }
        assert_eq!(sampler.acceptance(), vec![1.0]);
    }
}
