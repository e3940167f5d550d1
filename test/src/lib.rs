//! Test harness for the simlink crates: a mock simulator binding plus
//! helpers shared by the integration and e2e suites.

pub mod helpers;
