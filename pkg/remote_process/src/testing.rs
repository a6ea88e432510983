//! In-memory doubles for `ClusterClient` and `PortPool`, used by this
//! crate's own tests in place of a real cluster or OS port allocator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::errors::*;
use executor::lock;
use executor::sync::AsyncMutex;

use crate::client::{ClusterClient, PortPool, ProbePodSpec};
use crate::types::{Pod, WorkloadSpec};

struct State {
    pods: HashMap<String, Pod>,
    uploaded: HashMap<String, Vec<String>>,
    probes_created: Vec<ProbePodSpec>,
    workloads: HashMap<String, WorkloadSpec>,
    deleted_workloads: Vec<String>,
    pod_logs: HashMap<String, String>,
}

/// A `ClusterClient` backed entirely by in-memory maps. Tests seed it with
/// whatever pod state they need before exercising the crate's logic, rather
/// than polling: `wait_for_pod_condition` checks the predicate once against
/// whatever state was seeded, since nothing in this double ever transitions
/// on its own.
pub struct InMemoryClusterClient {
    state: AsyncMutex<State>,
}

impl InMemoryClusterClient {
    pub fn new() -> Self {
        Self {
            state: AsyncMutex::new(State {
                pods: HashMap::new(),
                uploaded: HashMap::new(),
                probes_created: vec![],
                workloads: HashMap::new(),
                deleted_workloads: vec![],
                pod_logs: HashMap::new(),
            }),
        }
    }

    pub async fn seed_pod(&self, pod: Pod) {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.pods.insert(pod.name.clone(), pod);
        });
    }

    pub async fn seed_pod_log(&self, pod_name: &str, log: &str) {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.pod_logs.insert(pod_name.to_string(), log.to_string());
        });
    }

    pub async fn uploaded_paths(&self, pod_name: &str) -> Vec<String> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state
                .uploaded
                .get(pod_name)
                .cloned()
                .unwrap_or_default()
        })
    }

    pub async fn submitted_workload(&self, workload_name: &str) -> Option<WorkloadSpec> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.workloads.get(workload_name).cloned()
        })
    }

    pub async fn was_deleted(&self, workload_name: &str) -> bool {
        lock!(state <= self.state.lock().await.unwrap(), {
            state
                .deleted_workloads
                .iter()
                .any(|name| name == workload_name)
        })
    }
}

#[async_trait]
impl ClusterClient for InMemoryClusterClient {
    async fn create_probe_pod(&self, spec: &ProbePodSpec) -> Result<()> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.probes_created.push(spec.clone());
        });
        Ok(())
    }

    async fn get_pod_logs(&self, pod_name: &str, _container_name: &str) -> Result<String> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state
                .pod_logs
                .get(pod_name)
                .cloned()
                .ok_or_else(|| format_err!("no log seeded for pod '{}'", pod_name))
        })
    }

    async fn list_pods_by_label(&self, key: &str, value: &str) -> Result<Vec<Pod>> {
        lock!(state <= self.state.lock().await.unwrap(), {
            Ok(state
                .pods
                .values()
                .filter(|pod| {
                    pod.labels
                        .iter()
                        .any(|(k, v)| k == key && v == value)
                })
                .cloned()
                .collect())
        })
    }

    async fn get_pod(&self, pod_name: &str) -> Result<Option<Pod>> {
        lock!(state <= self.state.lock().await.unwrap(), {
            Ok(state.pods.get(pod_name).cloned())
        })
    }

    async fn wait_for_pod_condition(
        &self,
        pod_name: &str,
        _timeout: Duration,
        predicate: &(dyn Fn(&Pod) -> bool + Send + Sync),
    ) -> Result<Pod> {
        let pod = lock!(state <= self.state.lock().await.unwrap(), {
            state.pods.get(pod_name).cloned()
        });

        match pod {
            Some(pod) if predicate(&pod) => Ok(pod),
            Some(_) => Err(format_err!(
                "pod '{}' never satisfied the condition",
                pod_name
            )),
            None => Err(format_err!("pod '{}' does not exist", pod_name)),
        }
    }

    async fn upload_file(
        &self,
        pod_name: &str,
        _container_name: &str,
        path: &str,
        contents: &[u8],
    ) -> Result<()> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state
                .uploaded
                .entry(pod_name.to_string())
                .or_insert_with(Vec::new)
                .push(path.to_string());
        });
        let _ = contents;
        Ok(())
    }

    async fn create_or_replace_workload(&self, spec: &WorkloadSpec) -> Result<()> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.workloads.insert(spec.name.clone(), spec.clone());
        });
        Ok(())
    }

    async fn delete_workload_foreground(&self, workload_name: &str) -> Result<()> {
        lock!(state <= self.state.lock().await.unwrap(), {
            state.workloads.remove(workload_name);
            state.deleted_workloads.push(workload_name.to_string());
        });
        Ok(())
    }
}

/// A `PortPool` backed by a fixed, pre-seeded set of ports handed out in
/// order and returned to the back of the line on release; mirrors the real
/// pool's "blocking queue of integers" shape (spec.md §6) without needing
/// actual OS sockets.
pub struct FixedPortPool {
    queue: Arc<executor::channel::queue::ConcurrentQueue<u16>>,
}

impl FixedPortPool {
    pub fn new(ports: Vec<u16>) -> Self {
        Self {
            queue: Arc::new(executor::channel::queue::ConcurrentQueue::from(ports)),
        }
    }
}

#[async_trait]
impl PortPool for FixedPortPool {
    async fn acquire(&self) -> u16 {
        self.queue.pop_front().await
    }

    fn release(&self, port: u16) {
        // `release` is synchronous but the queue's push is not; hand the
        // push off to an unattached task (dropping its `JoinHandle` here
        // does not cancel it, see `executor::linux::join_handle::JoinHandle`).
        let queue = self.queue.clone();
        executor::spawn(async move {
            queue.push_back(port).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerState, ContainerStatus};

    #[testcase]
    async fn seeded_pod_round_trips_through_get_pod() -> Result<()> {
        let cluster = InMemoryClusterClient::new();
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                ..Default::default()
            })
            .await;

        let pod = cluster.get_pod("job-1").await?;
        assert!(pod.is_some());
        assert_eq!(pod.unwrap().name, "job-1");

        let missing = cluster.get_pod("job-2").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[testcase]
    async fn wait_for_pod_condition_checks_seeded_state_once() -> Result<()> {
        let cluster = InMemoryClusterClient::new();
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                container_statuses: vec![ContainerStatus {
                    name: "main".to_string(),
                    state: ContainerState::Running,
                    ready: true,
                }],
                ..Default::default()
            })
            .await;

        let result = cluster
            .wait_for_pod_condition(
                "job-1",
                Duration::from_secs(1),
                &|pod| pod.is_terminal(),
            )
            .await;
        assert!(result.is_err());

        let pod = cluster
            .wait_for_pod_condition("job-1", Duration::from_secs(1), &|pod| {
                !pod.container_statuses.is_empty()
            })
            .await?;
        assert_eq!(pod.name, "job-1");

        Ok(())
    }

    #[testcase]
    async fn fixed_port_pool_hands_out_seeded_ports_in_order() -> Result<()> {
        let pool = FixedPortPool::new(vec![30001, 30002]);
        assert_eq!(pool.acquire().await, 30001);
        assert_eq!(pool.acquire().await, 30002);
        Ok(())
    }
}
