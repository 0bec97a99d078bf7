//! Local operators as sums of dense terms over site tuples.

use nqs_core::errors::{ErrorInfo, NqsError};
use nqs_core::Hilbert;
use nqs_graph::Lattice;
use serde::{Deserialize, Serialize};

/// One dense term of a [`LocalOperator`].
///
/// The matrix is expressed over the ordered sub-basis of the acting sites:
/// row/column indices are mixed-radix encodings of the local quantum numbers
/// on `acting_on`, with the first acting site as the most significant digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorTerm {
    matrix: Vec<Vec<f64>>,
    acting_on: Vec<usize>,
}

impl OperatorTerm {
    /// Matrix entries over the sub-basis of the acting sites.
    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// Ordered sites the term acts on.
    pub fn acting_on(&self) -> &[usize] {
        &self.acting_on
    }

    /// Sub-basis dimension (`local_size` to the number of acting sites).
    pub fn dimension(&self) -> usize {
        self.matrix.len()
    }

    /// Row index of a configuration restricted to the acting sites.
    pub fn row_of(&self, hilbert: &Hilbert, config: &[f64]) -> Result<usize, NqsError> {
        let base = hilbert.local_size();
        let mut row = 0usize;
        for &site in &self.acting_on {
            let value = *config.get(site).ok_or_else(|| {
                NqsError::Operator(
                    ErrorInfo::new("site-out-of-range", "configuration shorter than acting site")
                        .with_context("site", site.to_string()),
                )
            })?;
            let digit = hilbert.local_index(value).ok_or_else(|| {
                NqsError::Operator(
                    ErrorInfo::new("invalid-local-state", "configuration entry outside hilbert")
                        .with_context("site", site.to_string())
                        .with_context("value", value.to_string()),
                )
            })?;
            row = row * base + digit;
        }
        Ok(row)
    }

    /// Decodes a sub-basis column into per-site values on the acting sites.
    pub fn column_values(&self, hilbert: &Hilbert, column: usize) -> Vec<f64> {
        let base = hilbert.local_size();
        let mut digits = vec![0usize; self.acting_on.len()];
        let mut rest = column;
        for digit in digits.iter_mut().rev() {
            *digit = rest % base;
            rest /= base;
        }
        digits
            .into_iter()
            .map(|digit| hilbert.local_states()[digit])
            .collect()
    }
}

/// Configuration connected to the current one through an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Matrix element between the two configurations.
    pub mel: f64,
    /// Sites whose value changes; empty for the diagonal element.
    pub sites: Vec<usize>,
    /// New values at the changed sites, parallel to `sites`.
    pub values: Vec<f64>,
}

/// A hermitian-by-construction real operator: an ordered sum of dense terms,
/// each acting on a small tuple of sites of a shared [`Hilbert`] space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalOperator {
    hilbert: Hilbert,
    terms: Vec<OperatorTerm>,
}

impl LocalOperator {
    /// Creates an empty operator over the given space.
    pub fn new(hilbert: Hilbert) -> Self {
        Self {
            hilbert,
            terms: Vec::new(),
        }
    }

    /// Creates an operator from parallel matrix and site-tuple lists.
    pub fn from_terms(
        hilbert: Hilbert,
        matrices: Vec<Vec<Vec<f64>>>,
        acting_on: Vec<Vec<usize>>,
    ) -> Result<Self, NqsError> {
        if matrices.len() != acting_on.len() {
            return Err(NqsError::Operator(
                ErrorInfo::new(
                    "length-mismatch",
                    "matrix list and acting-on list differ in length",
                )
                .with_context("matrices", matrices.len().to_string())
                .with_context("acting_on", acting_on.len().to_string()),
            ));
        }
        let mut operator = Self::new(hilbert);
        for (matrix, sites) in matrices.into_iter().zip(acting_on) {
            operator.add_term(matrix, sites)?;
        }
        Ok(operator)
    }

    /// Appends a term after validating it against the operator's space.
    pub fn add_term(&mut self, matrix: Vec<Vec<f64>>, acting_on: Vec<usize>) -> Result<(), NqsError> {
        validate_term(&self.hilbert, &matrix, &acting_on)?;
        self.terms.push(OperatorTerm { matrix, acting_on });
        Ok(())
    }

    /// The space the operator acts on.
    pub fn hilbert(&self) -> &Hilbert {
        &self.hilbert
    }

    /// The ordered terms of the operator.
    pub fn terms(&self) -> &[OperatorTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Enumerates the configurations connected to `config`.
    ///
    /// The diagonal element (summed over all terms) is reported first with
    /// an empty change set; every off-diagonal non-zero entry of every term
    /// follows, listing only the sites whose value actually changes.
    pub fn find_conn(&self, config: &[f64]) -> Result<Vec<Connection>, NqsError> {
        self.hilbert.check_config(config).map_err(|err| {
            NqsError::Operator(
                ErrorInfo::new("bad-configuration", err.info().message.clone())
                    .with_context("source", err.info().code.clone()),
            )
        })?;
        let mut diagonal = 0.0;
        let mut connections = Vec::new();
        for term in &self.terms {
            let row = term.row_of(&self.hilbert, config)?;
            for (column, &mel) in term.matrix[row].iter().enumerate() {
                if mel == 0.0 {
                    continue;
                }
                if column == row {
                    diagonal += mel;
                    continue;
                }
                let new_values = term.column_values(&self.hilbert, column);
                let mut sites = Vec::new();
                let mut values = Vec::new();
                for (&site, &value) in term.acting_on.iter().zip(new_values.iter()) {
                    if config[site] != value {
                        sites.push(site);
                        values.push(value);
                    }
                }
                connections.push(Connection { mel, sites, values });
            }
        }
        let mut all = Vec::with_capacity(connections.len() + 1);
        all.push(Connection {
            mel: diagonal,
            sites: Vec::new(),
            values: Vec::new(),
        });
        all.extend(connections);
        Ok(all)
    }

    /// Transverse-field Ising Hamiltonian on a lattice:
    /// `H = -h sum_i sigma^x_i - j sum_{(i,k)} sigma^z_i sigma^z_k`.
    ///
    /// Requires a spin-1/2 space whose site count matches the lattice.
    pub fn ising(hilbert: Hilbert, lattice: &Lattice, h: f64, j: f64) -> Result<Self, NqsError> {
        if hilbert.local_size() != 2 {
            return Err(NqsError::Operator(
                ErrorInfo::new("unsupported-local-space", "ising requires a two-state space")
                    .with_context("local_size", hilbert.local_size().to_string()),
            ));
        }
        if hilbert.size() != lattice.size() {
            return Err(NqsError::Operator(
                ErrorInfo::new("size-mismatch", "hilbert and lattice disagree on site count")
                    .with_context("hilbert", hilbert.size().to_string())
                    .with_context("lattice", lattice.size().to_string()),
            ));
        }
        let mut operator = Self::new(hilbert);
        let flip = vec![vec![0.0, -h], vec![-h, 0.0]];
        for site in 0..operator.hilbert.size() {
            operator.add_term(flip.clone(), vec![site])?;
        }
        let states = operator.hilbert.local_states().to_vec();
        for &(a, b) in lattice.edges() {
            let mut zz = vec![vec![0.0; 4]; 4];
            for (row, entry) in zz.iter_mut().enumerate() {
                let va = states[row / 2];
                let vb = states[row % 2];
                entry[row] = -j * va * vb;
            }
            operator.add_term(zz, vec![a, b])?;
        }
        Ok(operator)
    }
}

fn validate_term(
    hilbert: &Hilbert,
    matrix: &[Vec<f64>],
    acting_on: &[usize],
) -> Result<(), NqsError> {
    if acting_on.is_empty() {
        return Err(NqsError::Operator(ErrorInfo::new(
            "empty-support",
            "term must act on at least one site",
        )));
    }
    for (idx, &site) in acting_on.iter().enumerate() {
        if site >= hilbert.size() {
            return Err(NqsError::Operator(
                ErrorInfo::new("site-out-of-range", "acting site beyond hilbert size")
                    .with_context("site", site.to_string())
                    .with_context("size", hilbert.size().to_string()),
            ));
        }
        if acting_on[..idx].contains(&site) {
            return Err(NqsError::Operator(
                ErrorInfo::new("duplicate-site", "acting sites must be distinct")
                    .with_context("site", site.to_string()),
            ));
        }
    }
    let mut expected: usize = 1;
    for _ in 0..acting_on.len() {
        expected = expected.checked_mul(hilbert.local_size()).ok_or_else(|| {
            NqsError::Operator(ErrorInfo::new(
                "support-too-large",
                "sub-basis dimension overflows usize",
            ))
        })?;
    }
    if matrix.len() != expected {
        return Err(NqsError::Operator(
            ErrorInfo::new("bad-matrix-dimension", "matrix rows do not match sub-basis")
                .with_context("expected", expected.to_string())
                .with_context("actual", matrix.len().to_string()),
        ));
    }
    for (row, entries) in matrix.iter().enumerate() {
        if entries.len() != expected {
            return Err(NqsError::Operator(
                ErrorInfo::new("ragged-matrix", "matrix must be square")
                    .with_context("row", row.to_string())
                    .with_context("expected", expected.to_string())
                    .with_context("actual", entries.len().to_string()),
            ));
        }
    }
    Ok(())
}
