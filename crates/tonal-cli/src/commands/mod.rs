//! CLI command implementations.

pub mod bank;
pub mod common;
pub mod cycle;
pub mod devices;
pub mod notes;
pub mod play;
pub mod render;
pub mod sequence;
