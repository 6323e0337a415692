//! Starlane CLI library.
//!
//! Terminal styling and output formatting shared by the `starlane` binary's
//! subcommands.

pub mod output;
pub mod terminal;
