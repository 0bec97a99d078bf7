#![deny(missing_docs)]

//! Local operators and connected-configuration enumeration.

mod local;

pub use local::{Connection, LocalOperator, OperatorTerm};
