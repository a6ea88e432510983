//! Per-call orchestration in front of `RemoteProcess::create` (spec.md
//! §4.6): allocates the two ports a child needs from an external pool,
//! constructs exactly one adapter, and leaves the pool as the only
//! contention point shared across concurrently-spawned children.
//!
//! Mirrors the shape of `container::client::meta::client::ClusterMetaClient`:
//! a small struct holding the handles an operation needs (here: a cluster
//! client, a port pool, a heartbeat target) that turns a caller's intent
//! into one call against the heavier-weight type it wraps.

use std::sync::Arc;

use common::errors::*;

use crate::client::{ClusterClient, HeartbeatConfig, PortPool};
use crate::process::{RemoteProcess, RemoteProcessOptions};
use crate::types::FileMapping;

/// What a caller of the factory provides for one child (spec.md §1): an
/// image reference, an optional entrypoint override, arguments, a bundle of
/// config files, and whether input will be written to the child.
///
/// Naming (`workload_name`, `probe_pod_name`) is left to the caller, which in
/// this workspace's intended deployment is the job-scheduler collaborator
/// named out of scope in spec.md §1 — this crate does not invent job
/// identifiers. The caller's reachable address is not a caller input at all:
/// per spec.md §4.3 it is discovered by `RemoteProcess::create` itself
/// (`net::netlink::local_ip`) and baked into the sidecar commands.
pub struct CreateOptions {
    pub workload_name: String,
    pub probe_pod_name: String,
    pub image: String,
    pub entrypoint_override: Option<String>,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub uses_input: bool,
    pub files: FileMapping,
}

/// Mints one `RemoteProcess` per call. Holds everything every child shares:
/// the namespace children are scheduled into, the cluster client, the
/// heartbeat endpoint children should poll, and the bounded pool of local
/// ports the factory draws two from per child.
pub struct RemoteProcessFactory {
    namespace: String,
    cluster: Arc<dyn ClusterClient>,
    port_pool: Arc<dyn PortPool>,
    heartbeat: HeartbeatConfig,
}

impl RemoteProcessFactory {
    pub fn new(
        namespace: String,
        cluster: Arc<dyn ClusterClient>,
        port_pool: Arc<dyn PortPool>,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        Self {
            namespace,
            cluster,
            port_pool,
            heartbeat,
        }
    }

    /// Namespace this factory schedules children into. `RemoteProcess`
    /// itself is namespace-agnostic (the `ClusterClient` it's handed does
    /// the actual scheduling); the factory threads the namespace through the
    /// resource names it builds for the workload and probe pod so two
    /// factories sharing one cluster never collide.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Runs the full startup sequence (spec.md §4.5 steps 1-8) for one
    /// child and returns a process whose streams are already connected.
    ///
    /// Port acquisition/release (spec.md's "dequeues two ports ... supplies
    /// a release callback") happens inside `RemoteProcess::create`, which
    /// holds the same `port_pool` this factory was constructed with; on any
    /// failure the ports are released before the error propagates, so the
    /// pool's held-port count is unaffected by a failed `create`.
    pub async fn create(&self, options: CreateOptions) -> Result<RemoteProcess> {
        let workload_name = self.qualify(&options.workload_name);
        let probe_pod_name = self.qualify(&options.probe_pod_name);

        let process_options = RemoteProcessOptions {
            workload_name,
            probe_pod_name,
            image: options.image,
            entrypoint_override: options.entrypoint_override,
            args: options.args,
            env: options.env,
            uses_input: options.uses_input,
            files: options.files,
        };

        RemoteProcess::create(
            self.cluster.clone(),
            self.port_pool.clone(),
            self.heartbeat.clone(),
            process_options,
        )
        .await
    }

    fn qualify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.namespace, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedPortPool, InMemoryClusterClient};

    fn heartbeat() -> HeartbeatConfig {
        HeartbeatConfig {
            host_alias: "host.cluster.internal".to_string(),
            port: 9090,
        }
    }

    fn options() -> CreateOptions {
        CreateOptions {
            workload_name: "job-1".to_string(),
            probe_pod_name: "job-1-probe".to_string(),
            image: "airbyte/source-faker:1.0".to_string(),
            entrypoint_override: Some("/airbyte/entrypoint.sh".to_string()),
            args: vec![],
            env: vec![],
            uses_input: false,
            files: FileMapping::new(),
        }
    }

    #[test]
    fn qualifies_resource_names_with_the_namespace() {
        let factory = RemoteProcessFactory::new(
            "ns-a".to_string(),
            Arc::new(InMemoryClusterClient::new()),
            Arc::new(FixedPortPool::new(vec![30001, 30002])),
            heartbeat(),
        );
        assert_eq!(factory.qualify("job-1"), "ns-a-job-1");
    }

    #[test]
    fn empty_namespace_leaves_names_untouched() {
        let factory = RemoteProcessFactory::new(
            String::new(),
            Arc::new(InMemoryClusterClient::new()),
            Arc::new(FixedPortPool::new(vec![30001, 30002])),
            heartbeat(),
        );
        assert_eq!(factory.qualify("job-1"), "job-1");
    }

    #[testcase]
    async fn namespace_prefix_is_applied_to_both_workload_and_probe_names() -> Result<()> {
        let factory = RemoteProcessFactory::new(
            "ns-a".to_string(),
            Arc::new(InMemoryClusterClient::new()),
            Arc::new(FixedPortPool::new(vec![30001, 30002])),
            heartbeat(),
        );

        let opts = options();
        assert_eq!(factory.qualify(&opts.workload_name), "ns-a-job-1");
        assert_eq!(factory.qualify(&opts.probe_pod_name), "ns-a-job-1-probe");

        Ok(())
    }
}
