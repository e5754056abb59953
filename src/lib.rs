//! Exact probability distributions for tabletop attack resolution.
//!
//! The [prob] module is the analytic core: distributions, convolution, the
//! single-die success model, the stage filter, and the ability and damage
//! transformations. [pipeline] wires those into the shared
//! attacks-to-casualties pipeline parameterized by ruleset, [scenario] loads
//! YAML matchup files, and [server]/[cli] expose the whole thing over HTTP
//! and the command line.

pub mod cli;
pub mod pipeline;
pub mod prob;
pub mod scenario;
pub mod server;
