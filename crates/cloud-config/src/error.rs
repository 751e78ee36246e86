//! Cloud config compiler errors

use crds::ProviderKind;
use thiserror::Error;

/// Errors returned by [`crate::compile`] and credential resolution.
///
/// Every variant describes malformed or incomplete input; none of them is
/// transient, so retrying with the same input yields the same error.
#[derive(Debug, Error)]
pub enum CloudConfigError {
    /// The provider endpoint is not a valid URL
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The GCP service account is not base64 encoded JSON
    #[error("invalid service account: {0}")]
    InvalidServiceAccount(String),

    /// The GCP service account has no `project_id`
    #[error("service account has an empty project_id")]
    MissingProjectId,

    /// The GCP datacenter lists no zone suffixes
    #[error("datacenter has no zone suffixes")]
    MissingZoneSuffixes,

    /// The datacenter has no settings for the cluster's provider
    #[error("datacenter has no {0} settings")]
    MissingDatacenterSpec(ProviderKind),

    /// The cluster version is not valid semver
    #[error("invalid Kubernetes version {version:?}: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// A required key is missing from the credentials Secret
    #[error("{provider} credentials are missing key {key:?}")]
    MissingCredential {
        provider: ProviderKind,
        key: &'static str,
    },

    /// The provider model could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CloudConfigError {
    fn from(e: serde_json::Error) -> Self {
        CloudConfigError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for CloudConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        CloudConfigError::Serialization(e.to_string())
    }
}

impl From<std::fmt::Error> for CloudConfigError {
    fn from(e: std::fmt::Error) -> Self {
        CloudConfigError::Serialization(e.to_string())
    }
}

/// Result alias for cloud config operations
pub type Result<T, E = CloudConfigError> = std::result::Result<T, E>;
