//! Kubernetes object references used by ClusterOps CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a Secret in a specific namespace
///
/// Clusters are cluster-scoped, so the namespace of the referenced Secret
/// must always be spelled out.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the Secret
    pub name: String,

    /// Namespace of the Secret
    pub namespace: String,
}

impl SecretReference {
    /// Create a new Secret reference
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}
