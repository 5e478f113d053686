//! CLI commands

pub mod check;
pub mod precompile;
pub mod render;
pub mod unit_name;
