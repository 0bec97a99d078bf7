#![deny(missing_docs)]

//! Markov-chain and exact samplers over variational wavefunctions.
//!
//! Every sampler, stochastic or exact, exposes the same five-operation
//! [`Sampler`] interface: reset the chain, advance one sweep, read the
//! visible configuration, replace it, and report acceptance statistics.
//! Stochastic variants are assembled from a proposal kernel plugged into
//! one of two generic Metropolis drivers (single chain or parallel
//! tempering ladder); the [`registry`] module maps variant names to the
//! assembled samplers.

/// Declarative YAML/JSON configuration schema.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Exact sampler over fully enumerable spaces.
pub mod exact;
/// Proposal kernel trait and the single-chain Metropolis driver.
pub mod kernel;
/// Caller-supplied weighted move operator proposals.
pub mod moves_custom;
/// Distance-bounded pair-exchange proposals.
pub mod moves_exchange;
/// Hamiltonian-guided proposals.
pub mod moves_hamiltonian;
/// Distance-bounded hop proposals.
pub mod moves_hop;
/// Single-site uniform redraw proposals.
pub mod moves_local;
/// Variant registration table and the sampler factory.
pub mod registry;
/// The uniform sampler interface.
pub mod sampler;
/// Parallel tempering ladder and replica-exchange driver.
pub mod tempering;

pub use config::{SamplerConfig, VariantConfig};
pub use exact::ExactSampler;
pub use kernel::{MetropolisSampler, Move, MoveKernel};
pub use registry::{build, build_with_sweep_size, variant_table, SamplerSpec, VariantInfo};
pub use sampler::Sampler;
pub use tempering::TemperedSampler;
