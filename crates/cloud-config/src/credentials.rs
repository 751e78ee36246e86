//! Resolved provider credentials
//!
//! Credentials are read from the Secret referenced by the cluster and handed
//! to [`crate::compile`] as plain strings. Their `Debug` output never shows
//! secret material, so they are safe to pass through `tracing` fields.

use crate::error::{CloudConfigError, Result};
use crds::ProviderKind;
use std::collections::BTreeMap;
use std::fmt;

pub const AZURE_TENANT_ID: &str = "tenantID";
pub const AZURE_SUBSCRIPTION_ID: &str = "subscriptionID";
pub const AZURE_CLIENT_ID: &str = "clientID";
pub const AZURE_CLIENT_SECRET: &str = "clientSecret";

pub const OPENSTACK_USERNAME: &str = "username";
pub const OPENSTACK_PASSWORD: &str = "password";
pub const OPENSTACK_DOMAIN: &str = "domain";
pub const OPENSTACK_PROJECT: &str = "project";
pub const OPENSTACK_PROJECT_ID: &str = "projectID";
pub const OPENSTACK_APPLICATION_CREDENTIAL_ID: &str = "applicationCredentialID";
pub const OPENSTACK_APPLICATION_CREDENTIAL_SECRET: &str = "applicationCredentialSecret";

pub const VSPHERE_USERNAME: &str = "username";
pub const VSPHERE_PASSWORD: &str = "password";

pub const GCP_SERVICE_ACCOUNT: &str = "serviceAccount";

const REDACTED: &str = "<redacted>";

/// Credentials for every provider that needs them in its cloud config.
///
/// AWS and KubeVirt cloud configs carry no credentials.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub azure: AzureCredentials,
    pub openstack: OpenstackCredentials,
    pub vsphere: VSphereCredentials,
    pub gcp: GcpCredentials,
}

#[derive(Clone, Default)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub subscription_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct OpenstackCredentials {
    pub username: String,
    pub password: String,
    pub domain: String,
    pub project: String,
    pub project_id: String,
    pub application_credential_id: String,
    pub application_credential_secret: String,
}

impl fmt::Debug for OpenstackCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenstackCredentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("domain", &self.domain)
            .field("project", &self.project)
            .field("project_id", &self.project_id)
            .field("application_credential_id", &self.application_credential_id)
            .field("application_credential_secret", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct VSphereCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for VSphereCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VSphereCredentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct GcpCredentials {
    /// Base64 encoded service account JSON
    pub service_account: String,
}

impl fmt::Debug for GcpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpCredentials")
            .field("service_account", &REDACTED)
            .finish()
    }
}

impl Credentials {
    /// Build credentials for `provider` from decoded Secret data.
    ///
    /// Only the sub-struct of `provider` is filled in. Keys that the provider
    /// cannot work without must be present and non-empty.
    pub fn from_secret_data(
        provider: ProviderKind,
        data: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut credentials = Credentials::default();
        let lookup = SecretLookup { provider, data };

        match provider {
            ProviderKind::Aws | ProviderKind::Kubevirt => {}
            ProviderKind::Azure => {
                credentials.azure = AzureCredentials {
                    tenant_id: lookup.required(AZURE_TENANT_ID)?,
                    subscription_id: lookup.required(AZURE_SUBSCRIPTION_ID)?,
                    client_id: lookup.required(AZURE_CLIENT_ID)?,
                    client_secret: lookup.required(AZURE_CLIENT_SECRET)?,
                };
            }
            ProviderKind::Openstack => {
                let application_credential_id =
                    lookup.optional(OPENSTACK_APPLICATION_CREDENTIAL_ID);
                let mut openstack = OpenstackCredentials {
                    domain: lookup.required(OPENSTACK_DOMAIN)?,
                    project: lookup.optional(OPENSTACK_PROJECT),
                    project_id: lookup.optional(OPENSTACK_PROJECT_ID),
                    ..Default::default()
                };
                if application_credential_id.is_empty() {
                    openstack.username = lookup.required(OPENSTACK_USERNAME)?;
                    openstack.password = lookup.required(OPENSTACK_PASSWORD)?;
                } else {
                    openstack.application_credential_secret =
                        lookup.required(OPENSTACK_APPLICATION_CREDENTIAL_SECRET)?;
                    openstack.application_credential_id = application_credential_id;
                }
                credentials.openstack = openstack;
            }
            ProviderKind::Vsphere => {
                credentials.vsphere = VSphereCredentials {
                    username: lookup.required(VSPHERE_USERNAME)?,
                    password: lookup.required(VSPHERE_PASSWORD)?,
                };
            }
            ProviderKind::Gcp => {
                credentials.gcp = GcpCredentials {
                    service_account: lookup.required(GCP_SERVICE_ACCOUNT)?,
                };
            }
        }

        Ok(credentials)
    }
}

struct SecretLookup<'a> {
    provider: ProviderKind,
    data: &'a BTreeMap<String, String>,
}

impl SecretLookup<'_> {
    fn required(&self, key: &'static str) -> Result<String> {
        match self.data.get(key) {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => Err(CloudConfigError::MissingCredential {
                provider: self.provider,
                key,
            }),
        }
    }

    fn optional(&self, key: &str) -> String {
        self.data.get(key).cloned().unwrap_or_default()
    }
}
