//! Local environment failures: the credential file and process settings.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SystemError {
    #[error("cannot {operation} {}: permission denied", .path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    #[error("{operation} failed: {message}")]
    Io {
        operation: String,
        path: Option<PathBuf>,
        message: String,
    },

    /// No home directory and no explicit credentials path.
    #[error("no home directory for the credential file")]
    NoHomeDirectory,

    #[error("{variable} is unusable: {message}")]
    EnvironmentError { variable: String, message: String },
}

impl SystemError {
    /// Wrap an I/O failure, singling out permission problems on a known path.
    pub fn from_io(err: io::Error, path: Option<PathBuf>, operation: &str) -> Self {
        let operation = operation.to_string();
        match path {
            Some(path) if err.kind() == io::ErrorKind::PermissionDenied => {
                SystemError::PermissionDenied { path, operation }
            }
            path => SystemError::Io {
                operation,
                path,
                message: err.to_string(),
            },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            SystemError::PermissionDenied { path, .. } => format!(
                "Genesis cannot access {}. Check the file permissions.",
                path.display()
            ),
            SystemError::Io { path: Some(p), operation, .. } => {
                format!("Could not {} {}.", operation, p.display())
            }
            SystemError::Io { operation, .. } => format!("Could not {}.", operation),
            SystemError::NoHomeDirectory => {
                "No home directory found. Set GENESIS_CREDENTIALS_PATH to choose where the session is stored."
                    .to_string()
            }
            SystemError::EnvironmentError { variable, .. } => {
                format!("Check the value of {}.", variable)
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SystemError::PermissionDenied { .. } => "E_SYS_PERM",
            SystemError::Io { .. } => "E_SYS_IO",
            SystemError::NoHomeDirectory => "E_SYS_NO_HOME",
            SystemError::EnvironmentError { .. } => "E_SYS_ENV",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_on_credential_file() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let sys = SystemError::from_io(err, Some(PathBuf::from("/tmp/creds.json")), "write");
        assert_eq!(sys.error_code(), "E_SYS_PERM");
        assert_eq!(sys.to_string(), "cannot write /tmp/creds.json: permission denied");
        assert!(sys.user_message().contains("/tmp/creds.json"));
    }

    #[test]
    fn test_permission_denied_without_path_is_plain_io() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let sys = SystemError::from_io(err, None, "read credentials");
        assert_eq!(sys.error_code(), "E_SYS_IO");
        assert_eq!(sys.to_string(), "read credentials failed: denied");
        assert_eq!(sys.user_message(), "Could not read credentials.");
    }

    #[test]
    fn test_no_home_directory_points_at_override() {
        assert!(SystemError::NoHomeDirectory
            .user_message()
            .contains("GENESIS_CREDENTIALS_PATH"));
    }
}
