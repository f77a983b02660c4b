//! # subrecon common
//!
//! Shared building blocks for the scanner: the run configuration, the target
//! and port models, the report tree and the setup error taxonomy.
//!
//! Nothing in here performs network IO.

pub mod config;
pub mod error;
pub mod network;
pub mod report;
