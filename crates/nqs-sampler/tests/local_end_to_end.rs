use nqs_core::{Hilbert, Machine, NqsError};
use nqs_graph::Lattice;
use nqs_machine::RbmSpin;
use nqs_operator::LocalOperator;
use nqs_sampler::{build, SamplerSpec};

/// Machine with an explicit two-site amplitude table, peaked on aligned
/// configurations.
struct TwoSiteMachine {
    hilbert: Hilbert,
}

impl Machine for TwoSiteMachine {
    fn hilbert(&self) -> &Hilbert {
        &self.hilbert
    }

    fn n_parameters(&self) -> usize {
        0
    }

    fn log_val(&self, config: &[f64]) -> Result<f64, NqsError> {
        self.hilbert.check_config(config)?;
        let aligned = config[0] == config[1];
        Ok(if aligned { 1.0 } else { 0.0 })
    }
}

#[test]
fn local_chain_prefers_the_heavier_states() {
    let machine = TwoSiteMachine {
        hilbert: Hilbert::spin_half(2).unwrap(),
    };
    let mut sampler = build(SamplerSpec::Local { machine: &machine }, 42).unwrap();

    let mut aligned = 0usize;
    let total = 4000usize;
    for _ in 0..total {
        sampler.sweep().unwrap();
        if sampler.visible()[0] == sampler.visible()[1] {
            aligned += 1;
        }
    }

    // Weight ratio e^2 : 1 per state pair puts the aligned share near 0.88.
    let share = aligned as f64 / total as f64;
    assert!(share > 0.8, "aligned share {share}");
}

#[test]
fn local_sweeps_keep_configurations_inside_the_space() {
    let machine = RbmSpin::new(Hilbert::spin_half(8).unwrap(), 2, 9).unwrap();
    let mut sampler = build(SamplerSpec::Local { machine: &machine }, 17).unwrap();

    for _ in 0..64 {
        sampler.sweep().unwrap();
        machine.hilbert().check_config(sampler.visible()).unwrap();
    }
}

#[test]
fn exchange_conserves_total_magnetization() {
    let machine = RbmSpin::new(Hilbert::spin_half(8).unwrap(), 2, 9).unwrap();
    let lattice = Lattice::chain(8, true).unwrap();
    let mut sampler = build(
        SamplerSpec::Exchange {
            graph: &lattice,
            machine: &machine,
            d_max: 2,
        },
        23,
    )
    .unwrap();

    let start = vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0];
    sampler.set_visible(&start).unwrap();
    let magnetization: f64 = start.iter().sum();

    for _ in 0..128 {
        sampler.sweep().unwrap();
        let current: f64 = sampler.visible().iter().sum();
        assert_eq!(current, magnetization);
    }
}

/// Machine that is flat over an arbitrary space.
struct FlatMachine {
    hilbert: Hilbert,
}

impl Machine for FlatMachine {
    fn hilbert(&self) -> &Hilbert {
        &self.hilbert
    }

    fn n_parameters(&self) -> usize {
        0
    }

    fn log_val(&self, config: &[f64]) -> Result<f64, NqsError> {
        self.hilbert.check_config(config)?;
        Ok(0.0)
    }
}

#[test]
fn custom_sweep_survives_a_dead_end_sub_state() {
    // The move matrix has no transition out of the third local state, so a
    // chain parked there proposes rejected moves instead of failing.
    let machine = FlatMachine {
        hilbert: Hilbert::new(2, vec![-1.0, 0.0, 1.0]).unwrap(),
    };
    let matrix = vec![
        vec![0.0, 1.0, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0],
    ];
    let mut sampler = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix],
            acting_on: vec![vec![0]],
            move_weights: Vec::new(),
        },
        41,
    )
    .unwrap();

    sampler.set_visible(&[1.0, 0.0]).unwrap();
    for _ in 0..16 {
        sampler.sweep().unwrap();
    }
    assert_eq!(sampler.visible(), &[1.0, 0.0]);
    assert_eq!(sampler.acceptance(), vec![0.0]);
}

#[test]
fn hamiltonian_sweep_survives_a_diagonal_only_operator() {
    let machine = FlatMachine {
        hilbert: Hilbert::spin_half(4).unwrap(),
    };
    let lattice = Lattice::chain(4, false).unwrap();
    // h = 0 leaves only zz diagonal terms: nothing is ever connected.
    let hamiltonian =
        LocalOperator::ising(Hilbert::spin_half(4).unwrap(), &lattice, 0.0, 1.0).unwrap();
    let mut sampler = build(
        SamplerSpec::Hamiltonian {
            machine: &machine,
            hamiltonian: &hamiltonian,
        },
        41,
    )
    .unwrap();

    let start = sampler.visible().to_vec();
    for _ in 0..16 {
        sampler.sweep().unwrap();
    }
    assert_eq!(sampler.visible(), start.as_slice());
    assert_eq!(sampler.acceptance(), vec![0.0]);
}

#[test]
fn same_seed_produces_identical_trajectories() {
    let machine = RbmSpin::new(Hilbert::spin_half(6).unwrap(), 2, 3).unwrap();

    let mut first = build(SamplerSpec::Local { machine: &machine }, 2024).unwrap();
    let mut second = build(SamplerSpec::Local { machine: &machine }, 2024).unwrap();

    for _ in 0..32 {
        first.sweep().unwrap();
        second.sweep().unwrap();
        assert_eq!(first.visible(), second.visible());
    }
    assert_eq!(first.acceptance(), second.acceptance());
}

#[test]
fn different_seeds_diverge() {
    let machine = RbmSpin::new(Hilbert::spin_half(6).unwrap(), 2, 3).unwrap();

    let mut first = build(SamplerSpec::Local { machine: &machine }, 1).unwrap();
    let mut second = build(SamplerSpec::Local { machine: &machine }, 2).unwrap();

    let mut diverged = false;
    for _ in 0..32 {
        first.sweep().unwrap();
        second.sweep().unwrap();
        if first.visible() != second.visible() {
            diverged = true;
            break;
        }
    }
    assert!(diverged);
}
