//! Integration tests driving the tools and the protocol loop over a scripted
//! workspace.

pub mod support;

mod protocol;
mod simulation;
mod world;
