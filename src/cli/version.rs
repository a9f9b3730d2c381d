//! Version information.

/// The current version of ntfy-relay, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent on outbound webhook requests.
pub const USER_AGENT: &str = concat!("ntfy-relay/", env!("CARGO_PKG_VERSION"));

/// Handle the -v command.
///
/// Prints the version string and exits successfully.
pub fn handle_version_command() -> ! {
    println!("ntfy-relay {}", VERSION);
    std::process::exit(0)
}
