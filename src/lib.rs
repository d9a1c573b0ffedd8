pub mod config;
pub mod error;
pub mod generate;
pub mod probe;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod tokenize;
pub mod util;
pub mod validate;

pub use error::ProbeError;
pub use probe::{Probe, ProbeResult};
