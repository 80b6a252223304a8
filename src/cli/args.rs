//! Command-line argument parsing for the genesis CLI.

/// Usage text printed for malformed invocations.
pub const USAGE: &str = "usage: genesis [--version] [login <email> | logout | whoami | watch]";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Log in with an email; the password is prompted for
    Login { email: String },
    /// End the stored session
    Logout,
    /// Show the signed-in user and wallets
    Whoami,
    /// Restore the session and follow push events and sync (default)
    Watch,
    /// Invalid invocation, with the reason
    Usage(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use genesis::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["genesis".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);
    let first = match args.next() {
        Some(arg) => arg,
        None => return CliCommand::Watch,
    };

    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "login" => match args.next() {
            Some(email) if !email.trim().is_empty() => CliCommand::Login {
                email: email.trim().to_string(),
            },
            _ => CliCommand::Usage("login requires an email address".to_string()),
        },
        "logout" => CliCommand::Logout,
        "whoami" => CliCommand::Whoami,
        "watch" => CliCommand::Watch,
        other => CliCommand::Usage(format!("unknown command '{}'", other)),
    }
}
