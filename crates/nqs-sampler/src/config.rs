//! Declarative sampler configuration loaded from YAML or JSON.

use serde::{Deserialize, Serialize};

use nqs_core::{ErrorInfo, Machine, NqsError};
use nqs_graph::Lattice;
use nqs_operator::LocalOperator;

use crate::registry::{self, SamplerSpec};
use crate::sampler::Sampler;

/// Top level sampler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Variant selection plus variant specific parameters.
    pub variant: VariantConfig,
    /// Master seed for all chains derived by the sampler.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Steps per sweep; omitted selects one step per visible unit.
    #[serde(default)]
    pub sweep_size: Option<usize>,
}

fn default_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

/// Variant tag and the parameters each strategy accepts.
///
/// Collaborators (machine, graph, hamiltonian) are supplied at build time
/// rather than serialized; the config only records scalars and the custom
/// move tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VariantConfig {
    /// Single-site Metropolis moves.
    Local,
    /// Single-site moves with parallel tempering.
    LocalPt {
        /// Number of replicas in the ladder.
        #[serde(default = "default_replicas")]
        n_replicas: usize,
    },
    /// Distance-bounded hop moves.
    Hop {
        /// Maximum hop distance.
        d_max: usize,
    },
    /// Moves guided by the off-diagonal structure of a Hamiltonian.
    Hamiltonian,
    /// Hamiltonian-guided moves with parallel tempering.
    HamiltonianPt {
        /// Number of replicas in the ladder.
        #[serde(default = "default_replicas")]
        n_replicas: usize,
    },
    /// Distance-bounded pair-exchange moves.
    Exchange {
        /// Maximum exchange distance.
        #[serde(default = "default_d_max")]
        d_max: usize,
    },
    /// Pair-exchange moves with parallel tempering.
    ExchangePt {
        /// Maximum exchange distance.
        #[serde(default = "default_d_max")]
        d_max: usize,
        /// Number of replicas in the ladder.
        #[serde(default = "default_exchange_replicas")]
        n_replicas: usize,
    },
    /// Direct sampling from the exact distribution.
    Exact,
    /// Caller supplied weighted move operators.
    Custom {
        /// Dense move matrices over sub-bases.
        move_operators: Vec<Vec<Vec<f64>>>,
        /// Site tuples each matrix acts on, parallel to `move_operators`.
        acting_on: Vec<Vec<usize>>,
        /// Per-operator weights; empty selects uniform weighting.
        #[serde(default)]
        move_weights: Vec<f64>,
    },
    /// Custom move operators with parallel tempering.
    CustomPt {
        /// Dense move matrices over sub-bases.
        move_operators: Vec<Vec<Vec<f64>>>,
        /// Site tuples each matrix acts on, parallel to `move_operators`.
        acting_on: Vec<Vec<usize>>,
        /// Per-operator weights; empty selects uniform weighting.
        #[serde(default)]
        move_weights: Vec<f64>,
        /// Number of replicas in the ladder.
        n_replicas: usize,
    },
}

fn default_replicas() -> usize {
    16
}

fn default_d_max() -> usize {
    1
}

fn default_exchange_replicas() -> usize {
    1
}

impl SamplerConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, NqsError> {
        serde_yaml::from_str(text).map_err(|err| {
            NqsError::Serde(
                ErrorInfo::new("bad-config", "failed to parse sampler configuration")
                    .with_context("format", "yaml")
                    .with_context("cause", err.to_string()),
            )
        })
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, NqsError> {
        serde_json::from_str(text).map_err(|err| {
            NqsError::Serde(
                ErrorInfo::new("bad-config", "failed to parse sampler configuration")
                    .with_context("format", "json")
                    .with_context("cause", err.to_string()),
            )
        })
    }

    /// Registered name of the configured variant.
    pub fn variant_name(&self) -> &'static str {
        match &self.variant {
            VariantConfig::Local => "local",
            VariantConfig::LocalPt { .. } => "local-pt",
            VariantConfig::Hop { .. } => "hop",
            VariantConfig::Hamiltonian => "hamiltonian",
            VariantConfig::HamiltonianPt { .. } => "hamiltonian-pt",
            VariantConfig::Exchange { .. } => "exchange",
            VariantConfig::ExchangePt { .. } => "exchange-pt",
            VariantConfig::Exact => "exact",
            VariantConfig::Custom { .. } => "custom",
            VariantConfig::CustomPt { .. } => "custom-pt",
        }
    }

    /// Binds the configured variant to its runtime collaborators.
    ///
    /// Graph and Hamiltonian are only consulted by the variants that need
    /// them; passing `None` for an unused collaborator is fine.
    pub fn into_spec<'a>(
        &self,
        machine: &'a dyn Machine,
        graph: Option<&'a Lattice>,
        hamiltonian: Option<&'a LocalOperator>,
    ) -> Result<SamplerSpec<'a>, NqsError> {
        let spec = match &self.variant {
            VariantConfig::Local => SamplerSpec::Local { machine },
            VariantConfig::LocalPt { n_replicas } => SamplerSpec::LocalPt {
                machine,
                n_replicas: *n_replicas,
            },
            VariantConfig::Hop { d_max } => SamplerSpec::Hop {
                graph: self.require_graph(graph)?,
                machine,
                d_max: *d_max,
            },
            VariantConfig::Hamiltonian => SamplerSpec::Hamiltonian {
                machine,
                hamiltonian: self.require_hamiltonian(hamiltonian)?,
            },
            VariantConfig::HamiltonianPt { n_replicas } => SamplerSpec::HamiltonianPt {
                machine,
                hamiltonian: self.require_hamiltonian(hamiltonian)?,
                n_replicas: *n_replicas,
            },
            VariantConfig::Exchange { d_max } => SamplerSpec::Exchange {
                graph: self.require_graph(graph)?,
                machine,
                d_max: *d_max,
            },
            VariantConfig::ExchangePt { d_max, n_replicas } => SamplerSpec::ExchangePt {
                graph: self.require_graph(graph)?,
                machine,
                d_max: *d_max,
                n_replicas: *n_replicas,
            },
            VariantConfig::Exact => SamplerSpec::Exact { machine },
            VariantConfig::Custom {
                move_operators,
                acting_on,
                move_weights,
            } => SamplerSpec::Custom {
                machine,
                move_operators: move_operators.clone(),
                acting_on: acting_on.clone(),
                move_weights: move_weights.clone(),
            },
            VariantConfig::CustomPt {
                move_operators,
                acting_on,
                move_weights,
                n_replicas,
            } => SamplerSpec::CustomPt {
                machine,
                move_operators: move_operators.clone(),
                acting_on: acting_on.clone(),
                move_weights: move_weights.clone(),
                n_replicas: *n_replicas,
            },
        };
        Ok(spec)
    }

    /// Builds the configured sampler against the supplied collaborators.
    pub fn build_sampler<'a>(
        &self,
        machine: &'a dyn Machine,
        graph: Option<&'a Lattice>,
        hamiltonian: Option<&'a LocalOperator>,
    ) -> Result<Box<dyn Sampler + 'a>, NqsError> {
        let spec = self.into_spec(machine, graph, hamiltonian)?;
        registry::build_with_sweep_size(spec, self.seed, self.sweep_size)
    }

    fn require_graph<'a>(&self, graph: Option<&'a Lattice>) -> Result<&'a Lattice, NqsError> {
        graph.ok_or_else(|| {
            NqsError::Sampler(
                ErrorInfo::new("missing-graph", "configured variant requires a lattice graph")
                    .with_context("variant", self.variant_name())
                    .with_hint("pass a Lattice when building this sampler"),
            )
        })
    }

    fn require_hamiltonian<'a>(
        &self,
        hamiltonian: Option<&'a LocalOperator>,
    ) -> Result<&'a LocalOperator, NqsError> {
        hamiltonian.ok_or_else(|| {
            NqsError::Sampler(
                ErrorInfo::new(
                    "missing-hamiltonian",
                    "configured variant requires a Hamiltonian operator",
                )
                .with_context("variant", self.variant_name())
                .with_hint("pass a LocalOperator when building this sampler"),
            )
        })
    }
}
