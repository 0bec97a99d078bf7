//! Restricted Boltzmann machine over spin configurations.

use nqs_core::errors::{ErrorInfo, NqsError};
use nqs_core::{Hilbert, Machine, RngHandle};
use serde::{Deserialize, Serialize};

/// Restricted Boltzmann machine with real parameters.
///
/// `log|psi(v)| = sum_i a_i v_i + sum_j ln(2 cosh(b_j + sum_i w_ij v_i))`
/// with `n_hidden = alpha * n_visible` hidden units. Parameters are
/// initialized uniformly in a small symmetric interval from a deterministic
/// seed, so two machines built from the same seed are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbmSpin {
    hilbert: Hilbert,
    visible_bias: Vec<f64>,
    hidden_bias: Vec<f64>,
    /// Row-major weights, `weights[j][i]` couples hidden `j` to visible `i`.
    weights: Vec<Vec<f64>>,
}

const INIT_SCALE: f64 = 0.05;

impl RbmSpin {
    /// Creates a machine with `alpha * size` hidden units and seeded
    /// uniform parameter initialization.
    pub fn new(hilbert: Hilbert, alpha: usize, seed: u64) -> Result<Self, NqsError> {
        if alpha == 0 {
            return Err(NqsError::Machine(ErrorInfo::new(
                "no-hidden-units",
                "rbm requires alpha >= 1",
            )));
        }
        let n_visible = hilbert.size();
        let n_hidden = alpha.checked_mul(n_visible).ok_or_else(|| {
            NqsError::Machine(ErrorInfo::new(
                "too-many-hidden-units",
                "hidden unit count overflows usize",
            ))
        })?;
        let mut rng = RngHandle::from_seed(seed);
        let mut draw = |rng: &mut RngHandle| (rng.next_unit() - 0.5) * 2.0 * INIT_SCALE;
        let visible_bias = (0..n_visible).map(|_| draw(&mut rng)).collect();
        let hidden_bias = (0..n_hidden).map(|_| draw(&mut rng)).collect();
        let weights = (0..n_hidden)
            .map(|_| (0..n_visible).map(|_| draw(&mut rng)).collect())
            .collect();
        Ok(Self {
            hilbert,
            visible_bias,
            hidden_bias,
            weights,
        })
    }

    /// Number of hidden units.
    pub fn n_hidden(&self) -> usize {
        self.hidden_bias.len()
    }

    /// Effective angles `theta_j = b_j + sum_i w_ij v_i`.
    fn thetas(&self, config: &[f64]) -> Vec<f64> {
        self.hidden_bias
            .iter()
            .zip(self.weights.iter())
            .map(|(&bias, row)| {
                bias + row
                    .iter()
                    .zip(config.iter())
                    .map(|(&w, &v)| w * v)
                    .sum::<f64>()
            })
            .collect()
    }
}

/// Numerically stable `ln(2 cosh(x))`.
fn ln_2cosh(x: f64) -> f64 {
    x.abs() + (-2.0 * x.abs()).exp().ln_1p()
}

impl Machine for RbmSpin {
    fn hilbert(&self) -> &Hilbert {
        &self.hilbert
    }

    fn n_parameters(&self) -> usize {
        self.visible_bias.len() + self.hidden_bias.len() + self.n_hidden() * self.hilbert.size()
    }

    fn log_val(&self, config: &[f64]) -> Result<f64, NqsError> {
        self.hilbert.check_config(config).map_err(|err| {
            NqsError::Machine(
                ErrorInfo::new("bad-configuration", err.info().message.clone())
                    .with_context("source", err.info().code.clone()),
            )
        })?;
        let bias_term: f64 = self
            .visible_bias
            .iter()
            .zip(config.iter())
            .map(|(&a, &v)| a * v)
            .sum();
        let hidden_term: f64 = self.thetas(config).iter().map(|&t| ln_2cosh(t)).sum();
        Ok(bias_term + hidden_term)
    }

    fn log_val_diff(
        &self,
        config: &[f64],
        sites: &[usize],
        values: &[f64],
    ) -> Result<f64, NqsError> {
        if sites.is_empty() {
            return Ok(0.0);
        }
        self.hilbert.check_config(config).map_err(|err| {
            NqsError::Machine(
                ErrorInfo::new("bad-configuration", err.info().message.clone())
                    .with_context("source", err.info().code.clone()),
            )
        })?;
        let mut bias_diff = 0.0;
        let mut deltas = vec![0.0; config.len()];
        for (&site, &value) in sites.iter().zip(values.iter()) {
            if site >= config.len() {
                return Err(NqsError::Machine(
                    ErrorInfo::new("site-out-of-range", "update touches a site beyond n_visible")
                        .with_context("site", site.to_string()),
                ));
            }
            // Later updates to the same site win, matching a sequential
            // application of the change list.
            bias_diff += self.visible_bias[site] * (value - config[site] - deltas[site]);
            deltas[site] = value - config[site];
        }
        let mut hidden_diff = 0.0;
        for (row, &bias) in self.weights.iter().zip(self.hidden_bias.iter()) {
            let theta: f64 = bias
                + row
                    .iter()
                    .zip(config.iter())
                    .map(|(&w, &v)| w * v)
                    .sum::<f64>();
            let shift: f64 = deltas
                .iter()
                .enumerate()
                .filter(|(_, &d)| d != 0.0)
                .map(|(site, &d)| row[site] * d)
                .sum();
            hidden_diff += ln_2cosh(theta + shift) - ln_2cosh(theta);
        }
        Ok(bias_diff + hidden_diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_machine() {
        let hilbert = Hilbert::spin_half(4).unwrap();
        let a = RbmSpin::new(hilbert.clone(), 2, 9).unwrap();
        let b = RbmSpin::new(hilbert, 2, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn diff_matches_recompute() {
        let hilbert = Hilbert::spin_half(5).unwrap();
        let machine = RbmSpin::new(hilbert.clone(), 3, 21).unwrap();
        let mut rng = RngHandle::from_seed(4);
        for _ in 0..32 {
            let config = hilbert.random_config(&mut rng);
            let site = rng.next_index(5);
            let flipped = -config[site];

            let fast = machine.log_val_diff(&config, &[site], &[flipped]).unwrap();
            let mut updated = config.clone();
            updated[site] = flipped;
            let slow = machine.log_val(&updated).unwrap() - machine.log_val(&config).unwrap();
            assert!((fast - slow).abs() < 1e-10, "diff mismatch: {fast} vs {slow}");
        }
    }

    #[test]
    fn diff_handles_multi_site_updates() {
        let hilbert = Hilbert::spin_half(4).unwrap();
        let machine = RbmSpin::new(hilbert, 2, 33).unwrap();
        let config = [1.0, -1.0, 1.0, -1.0];
        let fast = machine
            .log_val_diff(&config, &[0, 3], &[-1.0, 1.0])
            .unwrap();
        let slow = machine.log_val(&[-1.0, -1.0, 1.0, 1.0]).unwrap()
            - machine.log_val(&config).unwrap();
        assert!((fast - slow).abs() < 1e-10);
    }

    #[test]
    fn rejects_invalid_configurations() {
        let hilbert = Hilbert::spin_half(3).unwrap();
        let machine = RbmSpin::new(hilbert, 1, 0).unwrap();
        assert!(machine.log_val(&[1.0, 1.0]).is_err());
        assert!(machine.log_val(&[1.0, 0.5, -1.0]).is_err());
    }
}
