// wcf-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcfError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for WcfError {
    fn from(err: std::io::Error) -> Self {
        WcfError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_yaml::Error> for WcfError {
    fn from(err: serde_yaml::Error) -> Self {
        WcfError::Infrastructure(InfrastructureError::YamlError(err))
    }
}
