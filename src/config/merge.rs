//! Config composition: defaults, sources, precedence.

pub mod policy;
pub mod service;
