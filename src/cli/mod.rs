//! Command-line interface
//!
//! - encode: pack a (resource, relationship) pair
//! - decode: resolve a packed key
//! - tick: advance a named counter
//! - dump: print dictionaries and counters

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    decode, dump, encode, execute, load_config, run_command, run_command_to, tick,
};
pub use errors::{CliError, CliResult};

/// Parse arguments and run the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
