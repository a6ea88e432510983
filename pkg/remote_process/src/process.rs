//! The adapter itself (spec.md §4.5): makes a scheduled, multi-container
//! workload behave like a single local child process to an in-process
//! caller.
//!
//! Construction runs the whole startup sequence described in §4.5 before
//! `RemoteProcess::create` ever returns: bind listeners, resolve the image's
//! entrypoint, build and submit the workload, wait for the init container,
//! inject config, wait for the pod to become ready (or fail), and finally
//! dial/accept the data-plane connections. Everything after that point is
//! just bookkeeping over already-established streams.

use std::sync::Arc;
use std::time::Duration;

use common::errors::*;
use common::io::{Readable, Writeable};
use executor::lock_async;
use executor::sync::AsyncMutex;
use net::ip::{IPAddress, SocketAddr};
use net::tcp::{TcpListener, TcpStream};

use crate::client::{ClusterClient, HeartbeatConfig, PortPool};
use crate::error::RemoteProcessError;
use crate::inject;
use crate::introspect;
use crate::spec::{paths, ChildSpec, WorkloadSpecifier};
use crate::types::FileMapping;

const READY_OR_TERMINAL_TIMEOUT: Duration = Duration::from_secs(600);

/// `wait_for_pod_condition`'s own `timeout` parameter requires a bound; this
/// crate's `wait_for()` is meant to block indefinitely, so it passes a bound
/// long enough to never realistically trip and leaves real bounding to
/// `wait_for_timeout`.
const EFFECTIVELY_UNBOUNDED: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// How long to keep polling `list_pods_by_label` for the pod the just-submitted
/// workload schedules (spec.md §4.5 step 4: "Locate the pod by the workload's
/// label") before giving up.
const POD_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);
const POD_DISCOVERY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Everything the caller provides to start one remote child (spec.md §4.6,
/// factory's input).
pub struct RemoteProcessOptions {
    pub workload_name: String,
    pub probe_pod_name: String,
    pub image: String,
    /// When set, used verbatim as the primary container's entrypoint and
    /// `crate::introspect` is never invoked. When `None`, the entrypoint is
    /// resolved by probing `image` (spec.md §4.2).
    pub entrypoint_override: Option<String>,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub uses_input: bool,
    pub files: FileMapping,
}

/// The exit outcome of a finished remote process (spec.md §3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every container that terminated exited zero.
    Success,
    /// `destroy()` was called before the process reached a terminal state;
    /// reported the way a locally killed child process would be (128 + 15).
    Killed,
    /// The workload went terminal on its own with a nonzero combined exit
    /// code (spec.md's sum-of-terminated-exit-codes rule).
    Failed(i32),
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Killed => 143,
            ExitStatus::Failed(code) => *code,
        }
    }
}

struct Streams {
    output: Box<dyn Readable + Sync>,
    error: Box<dyn Readable + Sync>,
    input: Box<dyn Writeable>,
}

/// A running (or finished) remote child, presented as if it were a local
/// process.
pub struct RemoteProcess {
    cluster: Arc<dyn ClusterClient>,
    port_pool: Arc<dyn PortPool>,

    workload_name: String,
    pod_name: String,

    output_port: u16,
    error_port: u16,

    output_listener: AsyncMutex<Option<TcpListener>>,
    error_listener: AsyncMutex<Option<TcpListener>>,

    streams: AsyncMutex<Option<Streams>>,

    killed: AsyncMutex<bool>,
    exit_status: AsyncMutex<Option<ExitStatus>>,

    /// Guards `close()` so releasing the two ports happens exactly once no
    /// matter how many of `wait_for`/`wait_for_timeout`/`destroy` run or race
    /// (spec.md §5: "`close` is idempotent").
    closed: AsyncMutex<bool>,
}

impl RemoteProcess {
    /// Runs the full startup sequence and returns a process whose streams
    /// are already connected.
    pub async fn create(
        cluster: Arc<dyn ClusterClient>,
        port_pool: Arc<dyn PortPool>,
        heartbeat: HeartbeatConfig,
        options: RemoteProcessOptions,
    ) -> Result<Self> {
        let output_port = port_pool.acquire().await;
        let error_port = port_pool.acquire().await;

        let result = Self::create_inner(
            cluster.clone(),
            port_pool.clone(),
            heartbeat,
            options,
            output_port,
            error_port,
        )
        .await;

        match result {
            Ok(process) => Ok(process),
            Err(e) => {
                port_pool.release(output_port);
                port_pool.release(error_port);
                Err(e)
            }
        }
    }

    async fn create_inner(
        cluster: Arc<dyn ClusterClient>,
        port_pool: Arc<dyn PortPool>,
        heartbeat: HeartbeatConfig,
        options: RemoteProcessOptions,
        output_port: u16,
        error_port: u16,
    ) -> Result<Self> {
        let mut output_listener = TcpListener::bind(SocketAddr::new(
            IPAddress::V4([0, 0, 0, 0]),
            output_port,
        ))
        .await
        .map_err(|e| RemoteProcessError::Preflight(e))?;

        let mut error_listener = TcpListener::bind(SocketAddr::new(
            IPAddress::V4([0, 0, 0, 0]),
            error_port,
        ))
        .await
        .map_err(|e| RemoteProcessError::Preflight(e))?;

        // Baked into the relay sidecars' commands so they know where to dial
        // back to (spec.md §4.3: "The caller's host address is discovered on
        // the adapter side"), not supplied by the caller.
        let caller_host = net::netlink::local_ip()
            .map_err(|e| RemoteProcessError::Preflight(e))?
            .to_string();

        let entrypoint = match &options.entrypoint_override {
            Some(entrypoint) => entrypoint.clone(),
            None => introspect::resolve_entrypoint(
                cluster.as_ref(),
                &options.probe_pod_name,
                &options.image,
            )
            .await
            .map_err(|e| RemoteProcessError::Preflight(e))?,
        };

        let child_spec = ChildSpec {
            workload_name: options.workload_name.clone(),
            image: options.image.clone(),
            entrypoint,
            args: options.args,
            uses_input: options.uses_input,
            env: options.env,
        };

        let specifier = WorkloadSpecifier::new(heartbeat);
        let workload = specifier.build(&child_spec, &caller_host, output_port, error_port);

        cluster
            .create_or_replace_workload(&workload)
            .await
            .map_err(|e| RemoteProcessError::Scheduling(e))?;

        // spec.md §4.5 step 4: the pod's name is not assumed to match the
        // workload's; it is looked up by the label the workload specifier
        // stamped onto it (spec.rs's `WORKLOAD_NAME_LABEL`).
        let pod_name = match find_pod_by_label(cluster.as_ref(), &options.workload_name).await {
            Ok(name) => name,
            Err(e) => {
                Self::best_effort_delete(cluster.as_ref(), &options.workload_name).await;
                return Err(RemoteProcessError::Scheduling(e).into());
            }
        };

        // Past this point a workload is actually running in the cluster. Any
        // `Scheduling`-class failure from here on gets a best-effort delete
        // before the error propagates (spec.md §7); `Runtime` failures do
        // not, since a pod that went terminal on its own is already done,
        // not orphaned.
        let inject_result = inject::inject_files(
            cluster.as_ref(),
            &pod_name,
            paths::INIT_CONTAINER_NAME,
            &options.files,
        )
        .await;
        if let Err(e) = inject_result {
            Self::best_effort_delete(cluster.as_ref(), &options.workload_name).await;
            return Err(RemoteProcessError::Scheduling(e).into());
        }

        // A pod that goes terminal before ever becoming ready (e.g. a fast
        // entrypoint that prints a line and exits) is not a construction
        // failure (spec.md §7: "surface as a normal exit with the pod's
        // aggregated exit code"). The relay sidecars dial in independently of
        // whether the primary has already finished, so the listeners below
        // still have bytes waiting to be accepted; construction proceeds
        // normally and `wait_for`/`exit_value` report the real outcome once
        // called.
        let pod = match cluster
            .wait_for_pod_condition(&pod_name, READY_OR_TERMINAL_TIMEOUT, &|pod| {
                pod.is_ready() || pod.is_terminal()
            })
            .await
        {
            Ok(pod) => pod,
            Err(e) => {
                Self::best_effort_delete(cluster.as_ref(), &options.workload_name).await;
                return Err(RemoteProcessError::Scheduling(e).into());
            }
        };

        let output_stream = output_listener
            .accept()
            .await
            .map_err(|e| RemoteProcessError::Transport(e))?;
        let error_stream = error_listener
            .accept()
            .await
            .map_err(|e| RemoteProcessError::Transport(e))?;

        let (output_reader, _output_writer) = output_stream.split();
        let (error_reader, _error_writer) = error_stream.split();

        // spec.md §4.5 step 8: when input is unused, the process still hands
        // back a writable stream — one that silently discards everything
        // written to it — rather than nothing at all.
        let input: Box<dyn Writeable> = if options.uses_input {
            let address = pod.address.ok_or_else(|| {
                RemoteProcessError::Transport(format_err!(
                    "pod '{}' has no address to dial the input relay on",
                    pod_name
                ))
            })?;

            let stream = TcpStream::connect(SocketAddr::new(
                address.into(),
                paths::INPUT_RELAY_PORT,
            ))
            .await
            .map_err(|e| RemoteProcessError::Transport(e))?;

            let (_reader, writer) = stream.split();
            writer
        } else {
            Box::new(NullWriter)
        };

        Ok(Self {
            cluster,
            port_pool,
            workload_name: options.workload_name,
            pod_name,
            output_port,
            error_port,
            output_listener: AsyncMutex::new(Some(output_listener)),
            error_listener: AsyncMutex::new(Some(error_listener)),
            streams: AsyncMutex::new(Some(Streams {
                output: output_reader,
                error: error_reader,
                input,
            })),
            killed: AsyncMutex::new(false),
            exit_status: AsyncMutex::new(None),
            closed: AsyncMutex::new(false),
        })
    }

    /// Returns the writable stream feeding the child's standard input. When
    /// this process was created with `uses_input = false`, or once the real
    /// stream has already been taken once, returns a sink that silently
    /// discards every write (spec.md §4.5: "When input is not used, returns
    /// a sink that silently discards writes.").
    pub async fn input_stream(&self) -> Box<dyn Writeable> {
        lock_async!(streams <= self.streams.lock().await.unwrap(), {
            match streams.as_mut() {
                Some(s) => std::mem::replace(&mut s.input, Box::new(NullWriter)),
                None => Box::new(NullWriter),
            }
        })
    }

    /// Takes the readable end of the primary container's stdout relay.
    /// Returns `None` on every subsequent call.
    pub async fn output_stream(&self) -> Option<Box<dyn Readable + Sync>> {
        lock_async!(streams <= self.streams.lock().await.unwrap(), {
            streams.as_mut().map(|s| {
                std::mem::replace(&mut s.output, Box::new(EmptyReader))
            })
        })
    }

    /// Takes the readable end of the primary container's stderr relay.
    /// Returns `None` on every subsequent call.
    pub async fn error_stream(&self) -> Option<Box<dyn Readable + Sync>> {
        lock_async!(streams <= self.streams.lock().await.unwrap(), {
            streams.as_mut().map(|s| {
                std::mem::replace(&mut s.error, Box::new(EmptyReader))
            })
        })
    }

    /// Blocks until the process has reached a terminal state, returning its
    /// exit status. Always closes this process's resources before
    /// returning (spec.md §4.5: "Always closes adapter resources on exit").
    pub async fn wait_for(&self) -> Result<ExitStatus> {
        let result = self.wait_for_impl().await;
        self.close().await;
        result
    }

    /// Like `wait_for`, but gives up (returning an error) after `timeout`
    /// instead of blocking indefinitely. Always closes, same as `wait_for`.
    pub async fn wait_for_timeout(&self, timeout: Duration) -> Result<ExitStatus> {
        let result = match executor::timeout(timeout, self.wait_for_impl()).await {
            Ok(inner) => inner,
            Err(e) => Err(RemoteProcessError::Runtime(e).into()),
        };
        self.close().await;
        result
    }

    async fn wait_for_impl(&self) -> Result<ExitStatus> {
        if let Some(status) = self.cached_exit_status().await {
            return Ok(status);
        }

        // A `Err` here most plausibly means the pod vanished out from under
        // the poll (the destroy/wait_for race spec.md §5 describes), not a
        // real failure; it is not propagated directly. The refetch below
        // (spec.md §4.5: "On terminal, refetch the pod") is authoritative
        // either way.
        let wait_error = self
            .cluster
            .wait_for_pod_condition(&self.pod_name, EFFECTIVELY_UNBOUNDED, &|pod| {
                pod.is_terminal()
            })
            .await
            .err();

        let refetched = self
            .cluster
            .get_pod(&self.pod_name)
            .await
            .map_err(|e| RemoteProcessError::Runtime(e))?;

        let is_killed = lock_async!(killed <= self.killed.lock().await.unwrap(), { *killed });

        let status = match refetched {
            // Present and terminal: the pod's own aggregated exit code is
            // authoritative regardless of whether a kill was also issued.
            Some(pod) if pod.is_terminal() => {
                let code = pod.terminated_exit_code_sum();
                if code == 0 {
                    ExitStatus::Success
                } else {
                    ExitStatus::Failed(code)
                }
            }
            // Absent after a kill: the conventional "terminated by signal"
            // exit code, since the cluster has nothing left to report.
            None if is_killed => ExitStatus::Killed,
            // Absent without a kill, or present but still not terminal: the
            // pod should exist in a terminal state at this point; fail
            // loudly rather than guess.
            None => {
                return Err(RemoteProcessError::Runtime(wait_error.unwrap_or_else(|| {
                    format_err!(
                        "pod '{}' vanished without ever being killed",
                        self.pod_name
                    )
                }))
                .into());
            }
            Some(_) => {
                return Err(RemoteProcessError::Runtime(wait_error.unwrap_or_else(|| {
                    format_err!(
                        "pod '{}' was refetched but has not reached a terminal state",
                        self.pod_name
                    )
                }))
                .into());
            }
        };

        lock_async!(cached <= self.exit_status.lock().await.unwrap(), {
            *cached = Some(status);
        });

        Ok(status)
    }

    async fn cached_exit_status(&self) -> Option<ExitStatus> {
        lock_async!(cached <= self.exit_status.lock().await.unwrap(), { *cached })
    }

    /// Returns the cached exit status if `wait_for`/`wait_for_timeout` has
    /// already resolved one, without blocking.
    pub async fn exit_value(&self) -> Option<ExitStatus> {
        self.cached_exit_status().await
    }

    /// Marks this process as killed, deletes its workload, and closes this
    /// process's resources. Idempotent.
    pub async fn destroy(&self) -> Result<()> {
        lock_async!(killed <= self.killed.lock().await.unwrap(), {
            *killed = true;
        });

        let result: Result<()> = self
            .cluster
            .delete_workload_foreground(&self.workload_name)
            .await
            .map_err(|e| RemoteProcessError::Teardown(e).into());

        lock_async!(cached <= self.exit_status.lock().await.unwrap(), {
            if cached.is_none() {
                *cached = Some(ExitStatus::Killed);
            }
        });

        self.close().await;

        result
    }

    /// Releases every local resource this process is holding: the buffered
    /// streams, the two listeners, and finally the two TCP ports. Errors
    /// from any individual step are logged rather than propagated,
    /// mirroring `ContainerRuntime`'s teardown: a caller calling `close()`
    /// wants best-effort cleanup, not a report of which of several
    /// independent things failed. Idempotent: the ports are released on only
    /// the first call, no matter how many of `wait_for`/`wait_for_timeout`/
    /// `destroy` run or race against each other (spec.md §5).
    pub async fn close(&self) {
        let already_closed = lock_async!(closed <= self.closed.lock().await.unwrap(), {
            let was_closed = *closed;
            *closed = true;
            was_closed
        });
        if already_closed {
            return;
        }

        lock_async!(streams <= self.streams.lock().await.unwrap(), {
            *streams = None;
        });

        lock_async!(listener <= self.output_listener.lock().await.unwrap(), {
            *listener = None;
        });

        lock_async!(listener <= self.error_listener.lock().await.unwrap(), {
            *listener = None;
        });

        self.port_pool.release(self.output_port);
        self.port_pool.release(self.error_port);
    }

    /// Attempts to delete a just-submitted workload after a `Scheduling`
    /// failure (spec.md §7: "surface; attempt best-effort delete"). Swallows
    /// its own error the same way `close()`'s teardown steps do — a failed
    /// cleanup attempt must never mask the original failure.
    async fn best_effort_delete(cluster: &dyn ClusterClient, workload_name: &str) {
        if let Err(e) = cluster.delete_workload_foreground(workload_name).await {
            eprintln!(
                "remote_process: best-effort delete of workload '{}' failed: {}",
                workload_name, e
            );
        }
    }
}

/// Polls `list_pods_by_label` for the single pod carrying
/// `paths::WORKLOAD_NAME_LABEL` = `workload_name` (spec.md §4.5 step 4),
/// bounded by `POD_DISCOVERY_TIMEOUT`.
async fn find_pod_by_label(cluster: &dyn ClusterClient, workload_name: &str) -> Result<String> {
    let deadline = std::time::Instant::now() + POD_DISCOVERY_TIMEOUT;

    loop {
        let pods = cluster
            .list_pods_by_label(paths::WORKLOAD_NAME_LABEL, workload_name)
            .await?;

        match pods.len() {
            1 => return Ok(pods.into_iter().next().unwrap().name),
            0 => {
                if std::time::Instant::now() >= deadline {
                    return Err(format_err!(
                        "workload '{}' never scheduled a pod carrying label '{}' = '{}'",
                        workload_name,
                        paths::WORKLOAD_NAME_LABEL,
                        workload_name
                    ));
                }
                executor::sleep(POD_DISCOVERY_POLL_INTERVAL).await?;
            }
            n => {
                return Err(format_err!(
                    "workload '{}' has {} pods carrying label '{}' = '{}', expected exactly one",
                    workload_name,
                    n,
                    paths::WORKLOAD_NAME_LABEL,
                    workload_name
                ));
            }
        }
    }
}

#[cfg(test)]
impl RemoteProcess {
    /// Builds a `RemoteProcess` without running the network-facing part of
    /// `create()`, so `destroy`/`wait_for`/`close`'s bookkeeping can be unit
    /// tested against `testing::InMemoryClusterClient` without binding real
    /// sockets.
    fn for_testing(
        cluster: Arc<dyn ClusterClient>,
        port_pool: Arc<dyn PortPool>,
        workload_name: String,
        pod_name: String,
        output_port: u16,
        error_port: u16,
    ) -> Self {
        Self {
            cluster,
            port_pool,
            workload_name,
            pod_name,
            output_port,
            error_port,
            output_listener: AsyncMutex::new(None),
            error_listener: AsyncMutex::new(None),
            streams: AsyncMutex::new(None),
            killed: AsyncMutex::new(false),
            exit_status: AsyncMutex::new(None),
            closed: AsyncMutex::new(false),
        }
    }

    /// Sets the killed-flag directly, without caching an exit status the way
    /// `destroy()` does, so tests can exercise `wait_for`'s own
    /// killed-flag-plus-refetch derivation in isolation.
    async fn mark_killed_for_testing(&self) {
        lock_async!(killed <= self.killed.lock().await.unwrap(), {
            *killed = true;
        });
    }
}

/// Placeholder left behind after a stream has already been taken once, so
/// `output_stream()`/`error_stream()` can be called more than once without
/// panicking.
struct EmptyReader;

#[async_trait]
impl Readable for EmptyReader {
    async fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }
}

/// Discards every byte written to it. Returned by `input_stream()` both when
/// the process was created with `uses_input = false` (spec.md §4.5: "When
/// input is not used, returns a sink that silently discards writes.") and as
/// the placeholder left behind once the real input stream has already been
/// taken.
struct NullWriter;

#[async_trait]
impl Writeable for NullWriter {
    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedPortPool, InMemoryClusterClient};
    use crate::types::{ContainerState, ContainerStatus, Pod, WorkloadSpec};

    fn process(cluster: Arc<InMemoryClusterClient>) -> RemoteProcess {
        RemoteProcess::for_testing(
            cluster,
            Arc::new(FixedPortPool::new(vec![30001, 30002])),
            "job-1".to_string(),
            "job-1".to_string(),
            30001,
            30002,
        )
    }

    #[testcase]
    async fn destroy_marks_process_killed_and_deletes_workload() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .create_or_replace_workload(&WorkloadSpec {
                name: "job-1".to_string(),
                ..Default::default()
            })
            .await?;

        let process = process(cluster.clone());
        process.destroy().await?;

        assert!(cluster.was_deleted("job-1").await);
        assert_eq!(process.exit_value().await, Some(ExitStatus::Killed));

        Ok(())
    }

    #[testcase]
    async fn destroy_is_idempotent() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .create_or_replace_workload(&WorkloadSpec {
                name: "job-1".to_string(),
                ..Default::default()
            })
            .await?;

        let process = process(cluster);
        process.destroy().await?;
        process.destroy().await?;

        assert_eq!(process.exit_value().await, Some(ExitStatus::Killed));

        Ok(())
    }

    #[testcase]
    async fn wait_for_reports_success_when_every_container_exits_zero() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                container_statuses: vec![ContainerStatus {
                    name: paths::MAIN_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                init_container_statuses: vec![ContainerStatus {
                    name: paths::INIT_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                ..Default::default()
            })
            .await;

        let process = process(cluster);
        let status = process.wait_for().await?;

        assert_eq!(status, ExitStatus::Success);
        assert_eq!(status.code(), 0);

        Ok(())
    }

    #[testcase]
    async fn wait_for_sums_terminated_container_exit_codes() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                container_statuses: vec![
                    ContainerStatus {
                        name: paths::MAIN_CONTAINER_NAME.to_string(),
                        state: ContainerState::Terminated { exit_code: 2 },
                        ready: true,
                    },
                    ContainerStatus {
                        name: paths::HEARTBEAT_CONTAINER_NAME.to_string(),
                        state: ContainerState::Terminated { exit_code: 0 },
                        ready: true,
                    },
                ],
                init_container_statuses: vec![ContainerStatus {
                    name: paths::INIT_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                ..Default::default()
            })
            .await;

        let process = process(cluster);
        let status = process.wait_for().await?;

        assert_eq!(status, ExitStatus::Failed(2));

        Ok(())
    }

    #[testcase]
    async fn wait_for_reports_143_for_a_killed_pod_that_has_vanished() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        // No pod seeded: `get_pod` returns `None`, the same as a pod the
        // cluster has garbage collected after termination.

        let process = process(cluster);
        process.mark_killed_for_testing().await;

        let status = process.wait_for().await?;
        assert_eq!(status, ExitStatus::Killed);
        assert_eq!(status.code(), 143);

        Ok(())
    }

    #[testcase]
    async fn wait_for_prefers_the_observed_pod_outcome_over_the_killed_flag() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                container_statuses: vec![ContainerStatus {
                    name: paths::MAIN_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                init_container_statuses: vec![ContainerStatus {
                    name: paths::INIT_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                ..Default::default()
            })
            .await;

        let process = process(cluster);
        // A kill was issued, but the pod is still observable and exited
        // zero on its own: the real outcome wins, not the killed-flag.
        process.mark_killed_for_testing().await;

        let status = process.wait_for().await?;
        assert_eq!(status, ExitStatus::Success);

        Ok(())
    }

    #[test]
    fn exit_status_codes_match_conventional_process_exit_semantics() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Killed.code(), 143);
        assert_eq!(ExitStatus::Failed(7).code(), 7);
    }

    #[test]
    fn fixed_port_pool_is_constructible_for_tests() {
        let _pool = FixedPortPool::new(vec![30001, 30002]);
    }

    #[testcase]
    async fn input_stream_is_a_working_discard_sink_when_no_real_stream_was_attached() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        let process = process(cluster);

        let mut sink = process.input_stream().await;
        assert_eq!(sink.write(b"hello").await?, 5);
        sink.flush().await?;

        // A second call still hands back a working sink, not a stale one.
        let mut sink = process.input_stream().await;
        assert_eq!(sink.write(b"again").await?, 5);

        Ok(())
    }

    #[testcase]
    async fn wait_for_then_destroy_does_not_double_release_resources() -> Result<()> {
        let cluster = Arc::new(InMemoryClusterClient::new());
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                container_statuses: vec![ContainerStatus {
                    name: paths::MAIN_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                init_container_statuses: vec![ContainerStatus {
                    name: paths::INIT_CONTAINER_NAME.to_string(),
                    state: ContainerState::Terminated { exit_code: 0 },
                    ready: true,
                }],
                ..Default::default()
            })
            .await;

        let process = process(cluster);
        // `wait_for` already runs `close()` internally; `destroy` running
        // `close()` again afterwards must be a no-op, not a second release.
        let status = process.wait_for().await?;
        assert_eq!(status, ExitStatus::Success);

        process.destroy().await?;
        assert_eq!(process.exit_value().await, Some(ExitStatus::Success));

        Ok(())
    }
}
