use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("The order store is unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<CoreError> for AnalyticsError {
    fn from(err: CoreError) -> Self {
        AnalyticsError::InvalidArgument(err.to_string())
    }
}
