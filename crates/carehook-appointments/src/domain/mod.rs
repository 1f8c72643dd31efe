//! Domain layer: commands and their outcomes.

pub mod commands;
pub mod outcomes;
