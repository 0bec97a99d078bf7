//! Tagged-variant sampler factory and the declarative variant table.

use indexmap::IndexMap;
use nqs_core::{Machine, NqsError};
use nqs_graph::Lattice;
use nqs_operator::LocalOperator;

use crate::exact::ExactSampler;
use crate::kernel::{MetropolisSampler, MoveKernel};
use crate::moves_custom::CustomKernel;
use crate::moves_exchange::ExchangeKernel;
use crate::moves_hamiltonian::HamiltonianKernel;
use crate::moves_hop::HopKernel;
use crate::moves_local::LocalKernel;
use crate::sampler::Sampler;
use crate::tempering::TemperedSampler;

/// Variant tag plus the variant-specific parameter record.
///
/// Collaborators are borrowed, never owned: the machine, graph, and
/// operator must outlive the sampler built from the spec. Each variant
/// carries exactly the parameters its strategy needs; after
/// [`build`] the variants are indistinguishable behind the
/// [`Sampler`] interface.
pub enum SamplerSpec<'a> {
    /// Single-site Metropolis moves.
    Local {
        /// Machine to sample from.
        machine: &'a dyn Machine,
    },
    /// Single-site moves with parallel tempering.
    LocalPt {
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Number of replicas in the ladder.
        n_replicas: usize,
    },
    /// Distance-bounded hop moves.
    Hop {
        /// Lattice supplying distances.
        graph: &'a Lattice,
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Maximum hop distance.
        d_max: usize,
    },
    /// Moves guided by the off-diagonal structure of a Hamiltonian.
    Hamiltonian {
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Operator guiding the proposals.
        hamiltonian: &'a LocalOperator,
    },
    /// Hamiltonian-guided moves with parallel tempering.
    HamiltonianPt {
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Operator guiding the proposals.
        hamiltonian: &'a LocalOperator,
        /// Number of replicas in the ladder.
        n_replicas: usize,
    },
    /// Distance-bounded pair-exchange moves.
    Exchange {
        /// Lattice supplying distances.
        graph: &'a Lattice,
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Maximum exchange distance.
        d_max: usize,
    },
    /// Pair-exchange moves with parallel tempering.
    ExchangePt {
        /// Lattice supplying distances.
        graph: &'a Lattice,
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Maximum exchange distance.
        d_max: usize,
        /// Number of replicas in the ladder.
        n_replicas: usize,
    },
    /// Direct sampling from the exact distribution.
    Exact {
        /// Machine to sample from.
        machine: &'a dyn Machine,
    },
    /// Caller supplied weighted move operators.
    Custom {
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Dense move matrices over sub-bases.
        move_operators: Vec<Vec<Vec<f64>>>,
        /// Site tuples each matrix acts on, parallel to `move_operators`.
        acting_on: Vec<Vec<usize>>,
        /// Per-operator weights; empty selects uniform weighting.
        move_weights: Vec<f64>,
    },
    /// Custom move operators with parallel tempering.
    CustomPt {
        /// Machine to sample from.
        machine: &'a dyn Machine,
        /// Dense move matrices over sub-bases.
        move_operators: Vec<Vec<Vec<f64>>>,
        /// Site tuples each matrix acts on, parallel to `move_operators`.
        acting_on: Vec<Vec<usize>>,
        /// Per-operator weights; empty selects uniform weighting.
        move_weights: Vec<f64>,
        /// Number of replicas in the ladder.
        n_replicas: usize,
    },
}

impl SamplerSpec<'_> {
    /// Registered name of the variant.
    pub fn variant_name(&self) -> &'static str {
        match self {
            SamplerSpec::Local { .. } => "local",
            SamplerSpec::LocalPt { .. } => "local-pt",
            SamplerSpec::Hop { .. } => "hop",
            SamplerSpec::Hamiltonian { .. } => "hamiltonian",
            SamplerSpec::HamiltonianPt { .. } => "hamiltonian-pt",
            SamplerSpec::Exchange { .. } => "exchange",
            SamplerSpec::ExchangePt { .. } => "exchange-pt",
            SamplerSpec::Exact { .. } => "exact",
            SamplerSpec::Custom { .. } => "custom",
            SamplerSpec::CustomPt { .. } => "custom-pt",
        }
    }
}

/// Parameter requirements of a registered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    /// Parameters the variant requires.
    pub required: &'static [&'static str],
    /// Parameters the variant accepts with a default.
    pub optional: &'static [&'static str],
}

/// Declarative registration table: variant name to parameter contract, in
/// registration order. The table is the single source the factory and the
/// config layer validate against.
pub fn variant_table() -> IndexMap<&'static str, VariantInfo> {
    let mut table = IndexMap::new();
    table.insert(
        "local",
        VariantInfo {
            required: &["machine"],
            optional: &[],
        },
    );
    table.insert(
        "local-pt",
        VariantInfo {
            required: &["machine"],
            optional: &["n_replicas"],
        },
    );
    table.insert(
        "hop",
        VariantInfo {
            required: &["graph", "machine", "d_max"],
            optional: &[],
        },
    );
    table.insert(
        "hamiltonian",
        VariantInfo {
            required: &["machine", "hamiltonian"],
            optional: &[],
        },
    );
    table.insert(
        "hamiltonian-pt",
        VariantInfo {
            required: &["machine", "hamiltonian"],
            optional: &["n_replicas"],
        },
    );
    table.insert(
        "exchange",
        VariantInfo {
            required: &["graph", "machine"],
            optional: &["d_max"],
        },
    );
    table.insert(
        "exchange-pt",
        VariantInfo {
            required: &["graph", "machine"],
            optional: &["d_max", "n_replicas"],
        },
    );
    table.insert(
        "exact",
        VariantInfo {
            required: &["machine"],
            optional: &[],
        },
    );
    table.insert(
        "custom",
        VariantInfo {
            required: &["machine", "move_operators", "acting_on"],
            optional: &["move_weights"],
        },
    );
    table.insert(
        "custom-pt",
        VariantInfo {
            required: &["machine", "move_operators", "acting_on", "n_replicas"],
            optional: &["move_weights"],
        },
    );
    table
}

/// Builds a sampler from a variant spec and a master seed.
///
/// This is the single registration routine: every variant funnels through
/// the same two generic drivers (plus the exact sampler), so adding a
/// variant means adding a kernel and one table entry.
pub fn build<'a>(spec: SamplerSpec<'a>, seed: u64) -> Result<Box<dyn Sampler + 'a>, NqsError> {
    build_with_sweep_size(spec, seed, None)
}

/// [`build`] with an explicit per-sweep step count. The exact sampler
/// draws independent samples and ignores the override.
pub fn build_with_sweep_size<'a>(
    spec: SamplerSpec<'a>,
    seed: u64,
    sweep_size: Option<usize>,
) -> Result<Box<dyn Sampler + 'a>, NqsError> {
    match spec {
        SamplerSpec::Local { machine } => single(machine, LocalKernel::new(), seed, sweep_size),
        SamplerSpec::LocalPt {
            machine,
            n_replicas,
        } => tempered(machine, LocalKernel::new(), n_replicas, seed, sweep_size),
        SamplerSpec::Hop {
            graph,
            machine,
            d_max,
        } => {
            let kernel = HopKernel::new(graph, machine.n_visible(), d_max)?;
            single(machine, kernel, seed, sweep_size)
        }
        SamplerSpec::Hamiltonian {
            machine,
            hamiltonian,
        } => {
            let kernel = HamiltonianKernel::new(hamiltonian, machine.n_visible())?;
            single(machine, kernel, seed, sweep_size)
        }
        SamplerSpec::HamiltonianPt {
            machine,
            hamiltonian,
            n_replicas,
        } => {
            let kernel = HamiltonianKernel::new(hamiltonian, machine.n_visible())?;
            tempered(machine, kernel, n_replicas, seed, sweep_size)
        }
        SamplerSpec::Exchange {
            graph,
            machine,
            d_max,
        } => {
            let kernel = ExchangeKernel::new(graph, machine.n_visible(), d_max)?;
            single(machine, kernel, seed, sweep_size)
        }
        SamplerSpec::ExchangePt {
            graph,
            machine,
            d_max,
            n_replicas,
        } => {
            let kernel = ExchangeKernel::new(graph, machine.n_visible(), d_max)?;
            tempered(machine, kernel, n_replicas, seed, sweep_size)
        }
        SamplerSpec::Exact { machine } => Ok(Box::new(ExactSampler::new(machine, seed)?)),
        SamplerSpec::Custom {
            machine,
            move_operators,
            acting_on,
            move_weights,
        } => {
            let kernel =
                CustomKernel::new(machine.hilbert(), move_operators, acting_on, move_weights)?;
            single(machine, kernel, seed, sweep_size)
        }
        SamplerSpec::CustomPt {
            machine,
            move_operators,
            acting_on,
            move_weights,
            n_replicas,
        } => {
            let kernel =
                CustomKernel::new(machine.hilbert(), move_operators, acting_on, move_weights)?;
            tempered(machine, kernel, n_replicas, seed, sweep_size)
        }
    }
}

fn single<'a, K: MoveKernel + 'a>(
    machine: &'a dyn Machine,
    kernel: K,
    seed: u64,
    sweep_size: Option<usize>,
) -> Result<Box<dyn Sampler + 'a>, NqsError> {
    let mut sampler = MetropolisSampler::new(machine, kernel, seed)?;
    if let Some(steps) = sweep_size {
        sampler.set_sweep_size(steps)?;
    }
    Ok(Box::new(sampler))
}

fn tempered<'a, K: MoveKernel + 'a>(
    machine: &'a dyn Machine,
    kernel: K,
    n_replicas: usize,
    seed: u64,
    sweep_size: Option<usize>,
) -> Result<Box<dyn Sampler + 'a>, NqsError> {
    let mut sampler = TemperedSampler::new(machine, kernel, n_replicas, seed)?;
    if let Some(steps) = sweep_size {
        sampler.set_sweep_size(steps)?;
    }
    Ok(Box::new(sampler))
}
