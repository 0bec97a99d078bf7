use nqs_core::Hilbert;
use nqs_graph::Lattice;
use nqs_machine::RbmSpin;
use nqs_sampler::{build, SamplerSpec};

const SITES: usize = 4;

fn machine() -> RbmSpin {
    RbmSpin::new(Hilbert::spin_half(SITES).unwrap(), 1, 5).unwrap()
}

fn flip(site: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
    (vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec![site])
}

#[test]
fn mismatched_operator_and_site_lists_are_rejected() {
    let machine = machine();
    let (matrix, sites) = flip(0);
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix.clone(), matrix],
            acting_on: vec![sites],
            move_weights: Vec::new(),
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "length-mismatch");
}

#[test]
fn empty_operator_list_is_rejected() {
    let machine = machine();
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: Vec::new(),
            acting_on: Vec::new(),
            move_weights: Vec::new(),
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "no-move-operators");
}

#[test]
fn weight_list_must_match_operator_list() {
    let machine = machine();
    let (matrix, sites) = flip(0);
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix],
            acting_on: vec![sites],
            move_weights: vec![1.0, 2.0],
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "weight-length-mismatch");
}

#[test]
fn negative_weights_are_rejected() {
    let machine = machine();
    let (matrix, sites) = flip(0);
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix],
            acting_on: vec![sites],
            move_weights: vec![-1.0],
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "negative-weight");
}

#[test]
fn all_zero_weights_are_rejected() {
    let machine = machine();
    let (matrix_a, sites_a) = flip(0);
    let (matrix_b, sites_b) = flip(1);
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix_a, matrix_b],
            acting_on: vec![sites_a, sites_b],
            move_weights: vec![0.0, 0.0],
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "zero-weight-sum");
}

#[test]
fn diagonal_only_operator_is_rejected() {
    let machine = machine();
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![vec![vec![1.0, 0.0], vec![0.0, -1.0]]],
            acting_on: vec![vec![0]],
            move_weights: Vec::new(),
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "no-transitions");
}

#[test]
fn site_indices_are_checked_against_the_space() {
    let machine = machine();
    let (matrix, _) = flip(0);
    let err = build(
        SamplerSpec::Custom {
            machine: &machine,
            move_operators: vec![matrix],
            acting_on: vec![vec![SITES]],
            move_weights: Vec::new(),
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "site-out-of-range");
}

#[test]
fn zero_replicas_is_rejected() {
    let machine = machine();
    let err = build(
        SamplerSpec::LocalPt {
            machine: &machine,
            n_replicas: 0,
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "empty-ladder");
}

#[test]
fn exchange_with_no_clusters_is_rejected() {
    let machine = machine();
    let lattice = Lattice::from_edges(SITES, &[]).unwrap();
    let err = build(
        SamplerSpec::Exchange {
            graph: &lattice,
            machine: &machine,
            d_max: 1,
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "no-clusters");
}

#[test]
fn exchange_distance_bound_must_be_positive() {
    let machine = machine();
    let lattice = Lattice::chain(SITES, true).unwrap();
    let err = build(
        SamplerSpec::Exchange {
            graph: &lattice,
            machine: &machine,
            d_max: 0,
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "bad-distance-bound");
}

#[test]
fn lattice_size_must_match_the_machine() {
    let machine = machine();
    let lattice = Lattice::chain(SITES + 2, true).unwrap();
    let err = build(
        SamplerSpec::Exchange {
            graph: &lattice,
            machine: &machine,
            d_max: 1,
        },
        1,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "size-mismatch");
}
