//! CLI module for ntfy-relay.
//!
//! Parses flags and environment into a [`CliCommand`]:
//!
//! ```ignore
//! use ntfy_relay::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args_os())? {
//!     CliCommand::Help => print_help(),
//!     CliCommand::Version => handle_version_command(),
//!     CliCommand::Run(options) => { /* build config, start the relay */ }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, print_help, Args, CliCommand};
pub use version::{handle_version_command, USER_AGENT, VERSION};
