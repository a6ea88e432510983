//! External collaborators (spec.md §6): the cluster client and the port
//! pool. Both are out of scope for this crate to implement end-to-end — it
//! only defines the contract it needs and calls through it, the same way
//! `container::client::meta::client::ClusterMetaClient` is a thin typed
//! wrapper around an externally-provided `MetastoreClientInterface`.

use std::time::Duration;

use common::errors::*;

use crate::types::{Pod, WorkloadSpec};

/// A probe pod run by the image introspector (§4.2). It has no volumes and
/// a single container whose command is supplied by the caller.
#[derive(Debug, Clone)]
pub struct ProbePodSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
}

/// The cluster client this crate needs. Implemented by the caller (the real
/// implementation talks to whatever remote cluster API is in use); this
/// crate only ever calls through the trait.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Creates (or replaces) a short-lived single-container pod used to
    /// resolve the image's real entrypoint (§4.2).
    async fn create_probe_pod(&self, spec: &ProbePodSpec) -> Result<()>;

    /// Fetches the full log of a pod's single container. Used to read the
    /// probe pod's `AIRBYTE_ENTRYPOINT=...` line.
    async fn get_pod_logs(&self, pod_name: &str, container_name: &str) -> Result<String>;

    /// Lists every pod carrying the given label (key, value).
    async fn list_pods_by_label(&self, key: &str, value: &str) -> Result<Vec<Pod>>;

    /// Fetches a single pod by name. `Ok(None)` means the pod no longer
    /// exists (it may have been garbage collected after becoming terminal).
    async fn get_pod(&self, pod_name: &str) -> Result<Option<Pod>>;

    /// Blocks (subject to `timeout`) until `predicate(&pod)` returns true
    /// for the named pod, re-fetching the pod as needed. Returns the pod
    /// state at the moment the predicate first held.
    ///
    /// Implementations are expected to poll; this crate does not assume any
    /// particular polling interval, only that the bound in `timeout` is
    /// honored.
    async fn wait_for_pod_condition(
        &self,
        pod_name: &str,
        timeout: Duration,
        predicate: &(dyn Fn(&Pod) -> bool + Send + Sync),
    ) -> Result<Pod>;

    /// Streams `contents` into `path` inside the named container of the
    /// named pod (§4.4).
    async fn upload_file(
        &self,
        pod_name: &str,
        container_name: &str,
        path: &str,
        contents: &[u8],
    ) -> Result<()>;

    /// Submits (creating or replacing) the full multi-container workload.
    async fn create_or_replace_workload(&self, spec: &WorkloadSpec) -> Result<()>;

    /// Deletes the named workload with foreground propagation (the cluster
    /// blocks the delete call until all of the workload's pods are gone).
    async fn delete_workload_foreground(&self, workload_name: &str) -> Result<()>;
}

/// The external pool of local TCP ports the factory draws from (§4.6, §6).
/// Must support a blocking acquire and a non-blocking release.
#[async_trait]
pub trait PortPool: Send + Sync {
    async fn acquire(&self) -> u16;
    fn release(&self, port: u16);
}

/// Points the heartbeat-caller sidecar (§4.1, §4.3) at the caller's
/// heartbeat HTTP server.
///
/// Per spec.md §9's open question, the host alias used to reach back from
/// inside the pod to the caller is configurable rather than hard-coded: the
/// source this specification was distilled from hard-codes a
/// loopback-to-host alias, which may have been a deliberate platform choice
/// or a debugging artifact left behind. Making it a field lets a caller pick
/// whatever alias their cluster's container runtime actually provides.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Host (or host alias) the sidecar should use to reach the caller,
    /// e.g. `"host.docker.internal"` or a cluster-specific DNS name.
    pub host_alias: String,
    pub port: u16,
}

impl HeartbeatConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host_alias, self.port)
    }
}
