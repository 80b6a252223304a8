//! Coarse error classes that drive handling.
//!
//! Auth failures send the client back to anonymous. Network and server
//! failures are logged and the next scheduled attempt proceeds. User
//! errors become notifications. Protocol errors are dropped.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Auth,
    /// HTTP 5xx.
    Server,
    /// Business rejection or bad input, e.g. insufficient funds.
    User,
    /// Payload did not decode.
    Protocol,
    System,
    Configuration,
}

impl ErrorCategory {
    /// Transient classes; a later attempt may succeed unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::User => "user",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// One-line next step printed under CLI errors.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Is the Genesis API reachable? Check GENESIS_API_URL.",
            ErrorCategory::Auth => "Run `genesis login <email>`.",
            ErrorCategory::Server => "The API is failing; retry in a minute.",
            ErrorCategory::User => "Adjust the request and retry.",
            ErrorCategory::Protocol => "The API sent something unexpected; check client and server versions.",
            ErrorCategory::System => "Check permissions on the credential file.",
            ErrorCategory::Configuration => "Check the GENESIS_* environment variables.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
