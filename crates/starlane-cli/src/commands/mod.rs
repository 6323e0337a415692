// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs only parses and dispatches.

pub mod init;
pub mod route;
pub mod systems;
