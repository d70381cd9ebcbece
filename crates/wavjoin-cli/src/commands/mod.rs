//! CLI command implementations

pub mod assemble;
pub mod inspect;
pub mod join;
pub mod json_output;
pub mod wrap;

mod reporting;
