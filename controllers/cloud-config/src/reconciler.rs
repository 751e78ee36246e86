//! Reconciliation logic for Cluster CRDs.
//!
//! Clusters that are being deleted are skipped, and Clusters without a cloud
//! provider are marked as not requiring a config. For each other Cluster with
//! an assigned namespace this module:
//! 1. Fetches the Datacenter named in the cloud spec
//! 2. Reads the credentials Secret, if one is referenced
//! 3. Compiles the cloud config
//! 4. Applies the `cloud-config` ConfigMap
//! 5. Records the outcome in `status.cloudConfig`

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::metrics::{Metrics, ReconcileOutcome};
use chrono::{DateTime, Utc};
use cloud_config::{cloud_config_map, compile, Credentials, CLOUD_CONFIG_CONFIGMAP_NAME};
use crds::{CloudConfigState, CloudConfigStatus, CloudProvider, Cluster, Datacenter};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::Action;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Server-side apply field manager
const FIELD_MANAGER: &str = "clusterops-cloud-config";

/// Recheck interval while a Cluster waits for its namespace
const NAMESPACE_PENDING_REQUEUE: Duration = Duration::from_secs(15);

/// Per-cluster error backoff, keyed by cluster name
#[derive(Debug)]
pub struct ClusterBackoffs {
    min_seconds: u64,
    max_seconds: u64,
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl ClusterBackoffs {
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds,
            max_seconds,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next retry delay for `key`, advancing its sequence
    pub fn next(&self, key: &str) -> Duration {
        match self.states.lock() {
            Ok(mut states) => states
                .entry(key.to_string())
                .or_insert_with(|| FibonacciBackoff::new(self.min_seconds, self.max_seconds))
                .next_backoff(),
            Err(e) => {
                warn!("Failed to lock backoff states: {}, using minimum backoff", e);
                Duration::from_secs(self.min_seconds)
            }
        }
    }

    /// Restart the sequence of `key` after a successful reconciliation
    pub fn reset(&self, key: &str) {
        if let Ok(mut states) = self.states.lock() {
            if let Some(state) = states.get_mut(key) {
                state.reset();
            }
        }
    }

    /// Drop the state of `key` once its Cluster is gone
    pub fn forget(&self, key: &str) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.states.lock().map(|states| states.len()).unwrap_or_default()
    }
}

/// What a reconciliation has to do for a Cluster
#[derive(Debug, PartialEq)]
pub(crate) enum ReconcileStep<'a> {
    /// Deletion in progress; owner references clean up the ConfigMap
    Deleting,
    /// No namespace assigned yet
    AwaitNamespace,
    /// No cloud provider, nothing to compile
    NoProvider,
    Publish {
        namespace: &'a str,
        provider: &'a CloudProvider,
    },
}

pub(crate) fn next_step(cluster: &Cluster) -> ReconcileStep<'_> {
    if cluster.metadata.deletion_timestamp.is_some() {
        return ReconcileStep::Deleting;
    }
    let Some(namespace) = cluster.namespace_name() else {
        return ReconcileStep::AwaitNamespace;
    };
    match &cluster.spec.cloud.provider {
        None => ReconcileStep::NoProvider,
        Some(provider) => ReconcileStep::Publish {
            namespace,
            provider,
        },
    }
}

/// Reconciles the cloud config of Clusters.
pub struct Reconciler {
    client: Client,
    metrics: Arc<Metrics>,
    backoffs: ClusterBackoffs,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("backoffs", &self.backoffs)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(client: Client, metrics: Arc<Metrics>, backoffs: ClusterBackoffs) -> Self {
        Self {
            client,
            metrics,
            backoffs,
        }
    }

    /// Delay before retrying a failed Cluster
    pub fn error_backoff(&self, cluster: &Cluster) -> Duration {
        self.backoffs.next(&cluster.name_any())
    }

    /// Drop the retry state of a Cluster that no longer exists
    pub fn forget_cluster(&self, name: &str) {
        self.backoffs.forget(name);
    }

    /// Reconciles a Cluster resource.
    ///
    /// Errors caused by the Cluster's own declaration (bad credentials, an
    /// unusable datacenter, a config that does not compile) are written to
    /// `status.cloudConfig` before being returned.
    pub async fn reconcile_cluster(&self, cluster: &Cluster) -> Result<Action, ControllerError> {
        let name = cluster.name_any();

        let result = match next_step(cluster) {
            ReconcileStep::Deleting => {
                debug!("Cluster {} is being deleted", name);
                self.backoffs.forget(&name);
                return Ok(Action::await_change());
            }
            ReconcileStep::AwaitNamespace => {
                debug!("Cluster {} has no namespace yet, requeueing", name);
                self.metrics.record_reconcile(ReconcileOutcome::Pending);
                return Ok(Action::requeue(NAMESPACE_PENDING_REQUEUE));
            }
            ReconcileStep::NoProvider => {
                info!("Cluster {} has no cloud provider, no cloud config published", name);
                self.update_status(cluster, CloudConfigState::NotRequired, None, None)
                    .await
                    .map(|()| ReconcileOutcome::NotRequired)
            }
            ReconcileStep::Publish {
                namespace,
                provider,
            } => {
                info!("Reconciling cloud config of Cluster {}", name);
                self.publish(cluster, namespace, provider).await
            }
        };

        match result {
            Ok(outcome) => {
                self.backoffs.reset(&name);
                self.metrics.record_reconcile(outcome);
                Ok(Action::await_change())
            }
            Err(e) => {
                self.metrics.record_reconcile(ReconcileOutcome::Failed);
                if e.is_user_facing() {
                    error!("Cloud config of Cluster {} failed: {}", name, e);
                    self.update_status(cluster, CloudConfigState::Failed, None, Some(e.to_string()))
                        .await?;
                }
                Err(e)
            }
        }
    }

    async fn publish(
        &self,
        cluster: &Cluster,
        namespace: &str,
        provider: &CloudProvider,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let name = cluster.name_any();
        let datacenter_name = &cluster.spec.cloud.datacenter_name;

        let datacenters: Api<Datacenter> = Api::all(self.client.clone());
        let datacenter = datacenters.get_opt(datacenter_name).await?.ok_or_else(|| {
            ControllerError::NotFound(format!("Datacenter {}", datacenter_name))
        })?;

        let credentials = self.credentials(cluster, provider).await?;

        let started = Instant::now();
        let payload = compile(cluster, &datacenter.spec, &credentials)?;
        self.metrics
            .observe_compile(provider.kind().as_str(), started.elapsed().as_secs_f64());

        let config_map = cloud_config_map(cluster, namespace, &payload);
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        config_maps
            .patch(
                CLOUD_CONFIG_CONFIGMAP_NAME,
                &PatchParams::apply(FIELD_MANAGER).force(),
                &Patch::Apply(&config_map),
            )
            .await?;
        info!(
            "Applied ConfigMap {}/{} for Cluster {}",
            namespace, CLOUD_CONFIG_CONFIGMAP_NAME, name
        );

        self.update_status(
            cluster,
            CloudConfigState::Ready,
            Some(CLOUD_CONFIG_CONFIGMAP_NAME.to_string()),
            None,
        )
        .await?;
        Ok(ReconcileOutcome::Ready)
    }

    /// Credentials of the Cluster's provider from the referenced Secret.
    ///
    /// Without a reference only providers that need no credentials succeed.
    async fn credentials(
        &self,
        cluster: &Cluster,
        provider: &CloudProvider,
    ) -> Result<Credentials, ControllerError> {
        let data = match &cluster.spec.cloud.credentials_reference {
            Some(reference) => {
                let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &reference.namespace);
                let secret = secrets.get_opt(&reference.name).await?.ok_or_else(|| {
                    ControllerError::NotFound(format!(
                        "Secret {}/{}",
                        reference.namespace, reference.name
                    ))
                })?;
                secret_string_data(&secret)?
            }
            None => BTreeMap::new(),
        };

        Ok(Credentials::from_secret_data(provider.kind(), &data)?)
    }

    async fn update_status(
        &self,
        cluster: &Cluster,
        state: CloudConfigState,
        config_map: Option<String>,
        error: Option<String>,
    ) -> Result<(), ControllerError> {
        let name = cluster.name_any();
        let current = cluster.status.as_ref().and_then(|s| s.cloud_config.as_ref());

        if !status_needs_update(current, state, config_map.as_deref(), error.as_deref()) {
            debug!("Cloud config status of Cluster {} unchanged", name);
            return Ok(());
        }

        let patch = create_status_patch(state, config_map, error, Utc::now());
        let clusters: Api<Cluster> = Api::all(self.client.clone());
        clusters
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        debug!("Cloud config status of Cluster {} set to {:?}", name, state);
        Ok(())
    }
}

/// Whether `status.cloudConfig` differs from the desired values.
///
/// Only called with a fresh timestamp when something changed, so status writes
/// do not retrigger reconciliation forever.
pub(crate) fn status_needs_update(
    current: Option<&CloudConfigStatus>,
    state: CloudConfigState,
    config_map: Option<&str>,
    error: Option<&str>,
) -> bool {
    match current {
        None => true,
        Some(status) => {
            status.state != state
                || status.config_map.as_deref() != config_map
                || status.error.as_deref() != error
        }
    }
}

/// Merge patch for `status.cloudConfig`. Unset fields are sent as `null` so
/// a previous error or ConfigMap name is cleared.
pub(crate) fn create_status_patch(
    state: CloudConfigState,
    config_map: Option<String>,
    error: Option<String>,
    now: DateTime<Utc>,
) -> serde_json::Value {
    serde_json::json!({
        "status": {
            "cloudConfig": {
                "state": state,
                "configMap": config_map,
                "error": error,
                "lastReconciled": now,
            }
        }
    })
}

/// Secret data as UTF-8 strings
pub(crate) fn secret_string_data(
    secret: &Secret,
) -> Result<BTreeMap<String, String>, ControllerError> {
    secret
        .data
        .iter()
        .flatten()
        .map(|(key, value)| {
            String::from_utf8(value.0.clone())
                .map(|s| (key.clone(), s))
                .map_err(|_| {
                    ControllerError::InvalidSecret(format!(
                        "key {:?} of Secret {} is not valid UTF-8",
                        key,
                        secret.name_any()
                    ))
                })
        })
        .collect()
}
