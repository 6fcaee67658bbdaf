//! typefilter: remove members with unwanted types from a description model.
//!
//! The filtering engine lives in `typefilter-core` and is re-exported here;
//! this crate adds the host around it: configuration loading, JSON
//! responses, and the commands behind the `typefilter` binary.

pub use typefilter_core::{error as core_error, filter, matcher, model, pattern, skiptypes, types};

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
