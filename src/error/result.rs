//! Result type alias for Genesis operations.

use super::genesis_error::GenesisError;

/// Type alias for Results using GenesisError.
///
/// # Example
///
/// ```ignore
/// use genesis::error::GenesisResult;
///
/// async fn balance(api: &GenesisApi, wallet_id: &str) -> GenesisResult<WalletSnapshot> {
///     api.balance(wallet_id).await
/// }
/// ```
pub type GenesisResult<T> = Result<T, GenesisError>;

/// Extension trait for logging an error on its way through.
pub trait ResultExt<T> {
    /// Emit a `warn!` with the error code and message if the result is Err,
    /// then return it unchanged.
    fn log_warn(self, operation: &str) -> GenesisResult<T>;
}

impl<T> ResultExt<T> for GenesisResult<T> {
    fn log_warn(self, operation: &str) -> GenesisResult<T> {
        if let Err(err) = &self {
            tracing::warn!(
                operation,
                code = err.error_code(),
                category = %err.category(),
                "{}",
                err
            );
        }
        self
    }
}
