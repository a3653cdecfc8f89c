//! Command-line front end for the shapeck structural shape checker.
//!
//! Loads a JSON declaration file, lowers it into `ShapeRegistry` calls, runs
//! the queries it lists and renders the outcome.

pub mod args;
pub mod config;
pub mod driver;
pub mod lower;
pub mod reporter;
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "../tests/lower_tests.rs"]
mod lower_tests;
#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "../tests/reporter_tests.rs"]
mod reporter_tests;
#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tracing_config_tests;
