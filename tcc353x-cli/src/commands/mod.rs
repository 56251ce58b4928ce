//! Subcommand handlers.

pub(crate) mod firmware;
pub(crate) mod simulate;
pub(crate) mod tables;
