use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RotaError {
    ConfigurationError(String),
    ProvisioningError(String),
    SchedulerError(String),
}

impl fmt::Display for RotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotaError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            RotaError::ProvisioningError(msg) => write!(f, "Provisioning error: {msg}"),
            RotaError::SchedulerError(msg) => write!(f, "Scheduler error: {msg}"),
        }
    }
}

impl std::error::Error for RotaError {}

pub type Result<T> = std::result::Result<T, RotaError>;
