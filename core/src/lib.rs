//! # subrecon core
//!
//! The concurrent resolution-and-scan engine.
//!
//! * **[`scanner`]**: the coordinator, plus the [`scanner::resolver`] and
//!   [`scanner::prober`] abstractions it schedules.
//! * **[`network`]**: production backends (hickory DNS, TCP connect).
//! * **[`report`]**: deterministic assembly of the result tree.

pub mod network;
pub mod report;
pub mod scanner;
