//! wavjoin CLI library.
//!
//! This crate provides the collaborators around the `wavjoin-core` engine:
//! input discovery, ordered concurrent loading, output persistence, the
//! failure-tolerant error log, and the command implementations.

pub mod commands;
pub mod error_log;
pub mod input;
pub mod output;
pub mod producer;
