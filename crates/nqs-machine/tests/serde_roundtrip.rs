use nqs_core::{Hilbert, Machine};
use nqs_machine::RbmSpin;

#[test]
fn rbm_round_trips_json() {
    let machine = RbmSpin::new(Hilbert::spin_half(6).expect("hilbert"), 2, 31).expect("rbm");

    let json = serde_json::to_string_pretty(&machine).expect("serialize");
    let decoded: RbmSpin = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, machine);
    assert_eq!(decoded.n_hidden(), machine.n_hidden());
}

#[test]
fn decoded_rbm_evaluates_identically() {
    let machine = RbmSpin::new(Hilbert::spin_half(5).expect("hilbert"), 1, 13).expect("rbm");
    let json = serde_json::to_string(&machine).expect("serialize");
    let decoded: RbmSpin = serde_json::from_str(&json).expect("deserialize");

    let config = [1.0, -1.0, -1.0, 1.0, -1.0];
    let original = machine.log_val(&config).expect("log_val");
    let reparsed = decoded.log_val(&config).expect("log_val");
    assert_eq!(reparsed, original);
}
