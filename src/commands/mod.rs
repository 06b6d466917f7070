//! Subcommand implementations

pub mod extrapolate;
pub mod normalize;
pub mod probe;
pub mod sweep;
