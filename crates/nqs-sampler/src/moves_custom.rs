//! Custom weighted move-operator proposals.

use nqs_core::errors::ErrorInfo;
use nqs_core::{Hilbert, NqsError, RngHandle};
use nqs_operator::LocalOperator;

use crate::kernel::{Move, MoveKernel};

/// Proposes transitions drawn from a caller supplied set of move operators.
///
/// Each move operator is a dense matrix over the sub-basis of a site tuple;
/// a proposal first picks an operator (weighted by `move_weights`, uniform
/// by default), then a target column with probability proportional to the
/// absolute matrix element on the current row, diagonal excluded. The
/// correction is the log ratio of the reverse and forward row-normalized
/// transition probabilities. A row with no off-diagonal weight yields an
/// always-rejected proposal rather than an error.
#[derive(Debug)]
pub struct CustomKernel {
    operators: Vec<LocalOperator>,
    weights: Vec<f64>,
    total_weight: f64,
}

impl CustomKernel {
    /// Validates and compiles the parallel operator/site/weight lists.
    ///
    /// `move_weights` may be empty, which selects uniform weighting.
    pub fn new(
        hilbert: &Hilbert,
        move_operators: Vec<Vec<Vec<f64>>>,
        acting_on: Vec<Vec<usize>>,
        move_weights: Vec<f64>,
    ) -> Result<Self, NqsError> {
        if move_operators.len() != acting_on.len() {
            return Err(NqsError::Sampler(
                ErrorInfo::new(
                    "length-mismatch",
                    "move operator list and acting-on list differ in length",
                )
                .with_context("move_operators", move_operators.len().to_string())
                .with_context("acting_on", acting_on.len().to_string()),
            ));
        }
        if move_operators.is_empty() {
            return Err(NqsError::Sampler(ErrorInfo::new(
                "no-move-operators",
                "custom sampler needs at least one move operator",
            )));
        }
        let weights = if move_weights.is_empty() {
            vec![1.0; move_operators.len()]
        } else {
            if move_weights.len() != move_operators.len() {
                return Err(NqsError::Sampler(
                    ErrorInfo::new(
                        "weight-length-mismatch",
                        "move weight list does not match the move operator list",
                    )
                    .with_context("move_operators", move_operators.len().to_string())
                    .with_context("move_weights", move_weights.len().to_string()),
                ));
            }
            move_weights
        };
        for (index, &weight) in weights.iter().enumerate() {
            if !(weight >= 0.0) {
                return Err(NqsError::Sampler(
                    ErrorInfo::new("negative-weight", "move weights must be non-negative")
                        .with_context("index", index.to_string())
                        .with_context("weight", weight.to_string()),
                ));
            }
        }
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return Err(NqsError::Sampler(ErrorInfo::new(
                "zero-weight-sum",
                "move weights must sum to a positive value",
            )));
        }
        let mut operators = Vec::with_capacity(move_operators.len());
        for (matrix, sites) in move_operators.into_iter().zip(acting_on) {
            let operator =
                LocalOperator::from_terms(hilbert.clone(), vec![matrix], vec![sites])?;
            let term = &operator.terms()[0];
            let has_transition = term.matrix().iter().enumerate().any(|(row, entries)| {
                entries
                    .iter()
                    .enumerate()
                    .any(|(column, &mel)| column != row && mel != 0.0)
            });
            if !has_transition {
                return Err(NqsError::Sampler(
                    ErrorInfo::new(
                        "no-transitions",
                        "move operator has no off-diagonal element",
                    )
                    .with_context("index", operators.len().to_string()),
                ));
            }
            operators.push(operator);
        }
        Ok(Self {
            operators,
            weights,
            total_weight,
        })
    }

    /// Number of move operators.
    pub fn n_operators(&self) -> usize {
        self.operators.len()
    }

    /// Normalized weight of each move operator.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn pick_operator(&self, rng: &mut RngHandle) -> &LocalOperator {
        let mut draw = rng.next_unit() * self.total_weight;
        for (operator, &weight) in self.operators.iter().zip(self.weights.iter()) {
            if draw < weight {
                return operator;
            }
            draw -= weight;
        }
        // Rounding pushed the draw past the last positive weight.
        self.operators
            .iter()
            .zip(self.weights.iter())
            .rev()
            .find(|(_, &weight)| weight > 0.0)
            .map(|(operator, _)| operator)
            .unwrap_or(&self.operators[0])
    }
}

fn row_weight(matrix: &[Vec<f64>], row: usize) -> f64 {
    matrix[row]
        .iter()
        .enumerate()
        .filter(|&(column, _)| column != row)
        .map(|(_, &mel)| mel.abs())
        .sum()
}

impl MoveKernel for CustomKernel {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn propose(
        &self,
        visible: &[f64],
        hilbert: &Hilbert,
        rng: &mut RngHandle,
    ) -> Result<Move, NqsError> {
        let operator = self.pick_operator(rng);
        let term = &operator.terms()[0];
        let row = term.row_of(hilbert, visible)?;
        let matrix = term.matrix();

        let forward_sum = row_weight(matrix, row);
        if forward_sum <= 0.0 {
            // The chosen operator has no transition from this sub-state;
            // the step counts as a rejected proposal.
            return Ok(Move::rejected());
        }
        let mut draw = rng.next_unit() * forward_sum;
        let mut column = row;
        for (candidate, &mel) in matrix[row].iter().enumerate() {
            if candidate == row || mel == 0.0 {
                continue;
            }
            column = candidate;
            if draw < mel.abs() {
                break;
            }
            draw -= mel.abs();
        }

        let forward_prob = matrix[row][column].abs() / forward_sum;
        let reverse_mel = matrix[column][row].abs();
        let log_correction = if reverse_mel == 0.0 {
            // Irreversible transition: force rejection.
            f64::NEG_INFINITY
        } else {
            (reverse_mel / row_weight(matrix, column)).ln() - forward_prob.ln()
        };

        let new_values = term.column_values(hilbert, column);
        let mut sites = Vec::new();
        let mut values = Vec::new();
        for (&site, &value) in term.acting_on().iter().zip(new_values.iter()) {
            if visible[site] != value {
                sites.push(site);
                values.push(value);
            }
        }
        Ok(Move {
            sites,
            values,
            log_correction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigma_x() -> Vec<Vec<f64>> {
        vec![vec![0.0, 1.0], vec![1.0, 0.0]]
    }

    #[test]
    fn symmetric_operators_need_no_correction() {
        let hilbert = Hilbert::spin_half(2).unwrap();
        let kernel = CustomKernel::new(
            &hilbert,
            vec![sigma_x(), sigma_x()],
            vec![vec![0], vec![1]],
            Vec::new(),
        )
        .unwrap();
        let mut rng = RngHandle::from_seed(13);
        for _ in 0..32 {
            let mv = kernel.propose(&[1.0, -1.0], &hilbert, &mut rng).unwrap();
            assert_eq!(mv.sites.len(), 1);
            assert_eq!(mv.log_correction, 0.0);
        }
    }

    #[test]
    fn mismatched_lists_fail_at_construction() {
        let hilbert = Hilbert::spin_half(2).unwrap();
        let err = CustomKernel::new(&hilbert, vec![sigma_x()], vec![vec![0], vec![1]], Vec::new())
            .unwrap_err();
        assert_eq!(err.info().code, "length-mismatch");

        let err = CustomKernel::new(
            &hilbert,
            vec![sigma_x(), sigma_x()],
            vec![vec![0], vec![1]],
            vec![1.0],
        )
        .unwrap_err();
        assert_eq!(err.info().code, "weight-length-mismatch");

        let err = CustomKernel::new(&hilbert, vec![sigma_x()], vec![vec![0]], vec![-0.5])
            .unwrap_err();
        assert_eq!(err.info().code, "negative-weight");

        let err = CustomKernel::new(&hilbert, vec![sigma_x()], vec![vec![0]], vec![0.0])
            .unwrap_err();
        assert_eq!(err.info().code, "zero-weight-sum");

        let diagonal = vec![vec![1.0, 0.0], vec![0.0, -1.0]];
        let err =
            CustomKernel::new(&hilbert, vec![diagonal], vec![vec![0]], Vec::new()).unwrap_err();
        assert_eq!(err.info().code, "no-transitions");
    }

    #[test]
    fn dead_end_rows_propose_a_rejected_move() {
        // Row for the third local state has no off-diagonal weight; the
        // operator still validates because the other rows transition.
        let hilbert = Hilbert::new(2, vec![-1.0, 0.0, 1.0]).unwrap();
        let matrix = vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ];
        let kernel = CustomKernel::new(&hilbert, vec![matrix], vec![vec![0]], Vec::new()).unwrap();
        let mut rng = RngHandle::from_seed(7);
        let mv = kernel.propose(&[1.0, -1.0], &hilbert, &mut rng).unwrap();
        assert!(mv.is_rejected());
        assert!(mv.sites.is_empty());
    }

    #[test]
    fn zero_weight_operators_are_never_drawn() {
        let hilbert = Hilbert::spin_half(2).unwrap();
        let kernel = CustomKernel::new(
            &hilbert,
            vec![sigma_x(), sigma_x()],
            vec![vec![0], vec![1]],
            vec![1.0, 0.0],
        )
        .unwrap();
        let mut rng = RngHandle::from_seed(19);
        for _ in 0..64 {
            let mv = kernel.propose(&[1.0, 1.0], &hilbert, &mut rng).unwrap();
            assert_eq!(mv.sites, vec![0]);
        }
    }
}
