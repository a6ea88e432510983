//! Plain data types describing a workload and the pod it schedules.
//!
//! These mirror the shape of a Kubernetes-style pod/job API closely enough
//! for this crate's purposes, but are not generated from any wire schema:
//! the wire encoding is the responsibility of whatever `ClusterClient`
//! implementation a caller plugs in (see `crate::client`).

/// Maps an injected file's name (relative to `/config`) to its contents,
/// preserving insertion order.
///
/// Spec.md §8 scenario S6 requires the uploaded files to appear "in
/// insertion order of the mapping," which a `HashMap`/`BTreeMap` cannot
/// guarantee (hash order is unspecified; a `BTreeMap` reorders by key). A
/// small ordered vector is the only representation that satisfies both
/// that and the file injector's "every file strictly before the sentinel"
/// guarantee (see `crate::inject`).
#[derive(Debug, Clone, Default)]
pub struct FileMapping(Vec<(String, Vec<u8>)>);

impl FileMapping {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts `name` with `contents`. Re-inserting an existing name
    /// overwrites its contents in place rather than moving it to the end,
    /// matching a map's usual "insert" semantics while keeping first-seen
    /// order for everything else.
    pub fn insert(&mut self, name: String, contents: Vec<u8>) {
        if let Some(existing) = self.0.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = contents;
        } else {
            self.0.push((name, contents));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.0.iter().map(|(name, contents)| (name, contents))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Never,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        RestartPolicy::Never
    }
}

#[derive(Debug, Clone, Default)]
pub struct VolumeSpec {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct VolumeMount {
    pub volume_name: String,
    pub mount_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub mounts: Vec<VolumeMount>,
    pub working_dir: Option<String>,
}

/// Describes the multi-container workload submitted to the cluster.
///
/// Produced by `crate::spec::WorkloadSpecifier` and handed to
/// `ClusterClient::create_or_replace_workload`.
#[derive(Debug, Clone, Default)]
pub struct WorkloadSpec {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub restart_policy: RestartPolicy,
    pub volumes: Vec<VolumeSpec>,
    pub init_containers: Vec<ContainerSpec>,
    pub containers: Vec<ContainerSpec>,

    /// Caller-supplied time-to-live hint for garbage collecting a finished
    /// workload. Not enforced by this crate; threaded through to whatever
    /// `ClusterClient` implementation the caller provides.
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Waiting,
    Running,
    Terminated { exit_code: i32 },
}

impl ContainerState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, ContainerState::Terminated { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

#[derive(Debug, Clone)]
pub struct ContainerStatus {
    pub name: String,
    pub state: ContainerState,
    pub ready: bool,
}

/// Observed state of a pod, as returned by `ClusterClient::get_pod` /
/// `list_pods_by_label`.
#[derive(Debug, Clone, Default)]
pub struct Pod {
    pub name: String,
    pub labels: Vec<(String, String)>,

    /// IP address usable by the adapter to dial the pod's input-relay
    /// sidecar. `None` until the cluster has scheduled the pod.
    pub address: Option<std::net::IpAddr>,

    pub init_container_statuses: Vec<ContainerStatus>,
    pub container_statuses: Vec<ContainerStatus>,
}

impl Pod {
    /// True once the cluster's readiness predicate holds: every container
    /// (init and main) reports `ready`.
    pub fn is_ready(&self) -> bool {
        self.init_container_statuses.iter().all(|c| c.ready)
            && self.container_statuses.iter().all(|c| c.ready)
            && !self.container_statuses.is_empty()
    }

    /// True once at least one container (init or main) has terminated.
    pub fn is_terminal(&self) -> bool {
        self.init_container_statuses
            .iter()
            .any(|c| c.state.is_terminated())
            || self
                .container_statuses
                .iter()
                .any(|c| c.state.is_terminated())
    }

    /// True once at least one init container is running (but the pod as a
    /// whole need not be ready yet).
    pub fn has_running_init_container(&self) -> bool {
        self.init_container_statuses
            .iter()
            .any(|c| c.state.is_running())
    }

    /// Sum of the exit codes of every terminated container (init + main).
    /// Zero iff every container that has terminated exited zero and at
    /// least one container has terminated.
    pub fn terminated_exit_code_sum(&self) -> i32 {
        let mut sum = 0;
        for status in self
            .init_container_statuses
            .iter()
            .chain(self.container_statuses.iter())
        {
            if let ContainerState::Terminated { exit_code } = status.state {
                sum += exit_code;
            }
        }
        sum
    }
}
