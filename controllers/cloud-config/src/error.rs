//! Controller-specific error types.

use cloud_config::CloudConfigError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the Cloud Config Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// The cloud config could not be compiled
    #[error("Cloud config error: {0}")]
    CloudConfig(#[from] CloudConfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A resource the Cluster refers to does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The credentials Secret could not be read
    #[error("Invalid credentials Secret: {0}")]
    InvalidSecret(String),

    /// The probe and metrics server failed
    #[error("Server error: {0}")]
    Server(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Errors caused by the cluster's own declaration, reported on its status
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ControllerError::CloudConfig(_)
                | ControllerError::NotFound(_)
                | ControllerError::InvalidSecret(_)
        )
    }
}
