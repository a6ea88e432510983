//! Builds the full `WorkloadSpec` for a child (spec.md §4.3): an init
//! container, a main container, two or three relay sidecars, and a
//! heartbeat-caller sidecar, wired together through the shared scratch
//! volumes described in `paths`.

use crate::client::HeartbeatConfig;
use crate::shell;
use crate::types::*;

/// Shared volume/mount/port literals, centralized here the way
/// `container::client::meta::constants` centralizes the env var names
/// shared between the node and meta client.
pub mod paths {
    pub const PIPES_VOLUME: &str = "airbyte-pipes";
    pub const PIPES_MOUNT: &str = "/pipes";
    pub const CONFIG_VOLUME: &str = "airbyte-config";
    pub const CONFIG_MOUNT: &str = "/config";
    pub const TERMINATION_VOLUME: &str = "airbyte-termination";
    pub const TERMINATION_MOUNT: &str = "/termination";

    pub const STDIN_PIPE: &str = "/pipes/stdin";
    pub const STDOUT_PIPE: &str = "/pipes/stdout";
    pub const STDERR_PIPE: &str = "/pipes/stderr";

    pub const FINISHED_UPLOADING: &str = "/config/FINISHED_UPLOADING";
    pub const MAIN_TERMINATION_FILE: &str = "/termination/main";

    /// Port the input-relay sidecar listens on inside the pod.
    pub const INPUT_RELAY_PORT: u16 = 9001;

    pub const INIT_CONTAINER_NAME: &str = "init";
    pub const MAIN_CONTAINER_NAME: &str = "main";
    pub const OUTPUT_RELAY_CONTAINER_NAME: &str = "output-relay";
    pub const ERROR_RELAY_CONTAINER_NAME: &str = "error-relay";
    pub const INPUT_RELAY_CONTAINER_NAME: &str = "input-relay";
    pub const HEARTBEAT_CONTAINER_NAME: &str = "heartbeat";

    pub const WORKLOAD_NAME_LABEL: &str = "airbyte/remote-process";
}

const BUSYBOX_IMAGE: &str = "busybox:1.36";
const SOCAT_IMAGE: &str = "alpine/socat:1.7.4.4";
const CURL_IMAGE: &str = "curlimages/curl:8.4.0";

/// What the caller wants run, after `crate::introspect` has resolved the
/// real entrypoint.
pub struct ChildSpec {
    pub workload_name: String,
    pub image: String,
    pub entrypoint: String,
    pub args: Vec<String>,
    pub uses_input: bool,
    pub env: Vec<(String, String)>,
}

pub struct WorkloadSpecifier {
    heartbeat: HeartbeatConfig,
}

impl WorkloadSpecifier {
    pub fn new(heartbeat: HeartbeatConfig) -> Self {
        Self { heartbeat }
    }

    /// Builds the full workload for `child`, relaying output/error back to
    /// `caller_host` on `output_port`/`error_port`.
    pub fn build(
        &self,
        child: &ChildSpec,
        caller_host: &str,
        output_port: u16,
        error_port: u16,
    ) -> WorkloadSpec {
        let pipes_mount = VolumeMount {
            volume_name: paths::PIPES_VOLUME.to_string(),
            mount_path: paths::PIPES_MOUNT.to_string(),
        };
        let config_mount = VolumeMount {
            volume_name: paths::CONFIG_VOLUME.to_string(),
            mount_path: paths::CONFIG_MOUNT.to_string(),
        };
        let termination_mount = VolumeMount {
            volume_name: paths::TERMINATION_VOLUME.to_string(),
            mount_path: paths::TERMINATION_MOUNT.to_string(),
        };

        let init_container = ContainerSpec {
            name: paths::INIT_CONTAINER_NAME.to_string(),
            image: child.image.clone(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: vec![shell::init_fragment(child.uses_input)],
            env: vec![],
            mounts: vec![pipes_mount.clone(), config_mount.clone()],
            working_dir: Some(paths::CONFIG_MOUNT.to_string()),
        };

        let main_container = ContainerSpec {
            name: paths::MAIN_CONTAINER_NAME.to_string(),
            image: child.image.clone(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: vec![shell::main_fragment(
                &child.entrypoint,
                &child.args,
                child.uses_input,
            )],
            env: child.env.clone(),
            mounts: vec![
                pipes_mount.clone(),
                config_mount.clone(),
                termination_mount.clone(),
            ],
            working_dir: Some(paths::CONFIG_MOUNT.to_string()),
        };

        let output_relay = ContainerSpec {
            name: paths::OUTPUT_RELAY_CONTAINER_NAME.to_string(),
            image: SOCAT_IMAGE.to_string(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: vec![shell::happy_closer(&shell::relay_pipe_to_tcp_command(
                paths::STDOUT_PIPE,
                caller_host,
                output_port,
            ))],
            env: vec![],
            mounts: vec![pipes_mount.clone(), termination_mount.clone()],
            working_dir: None,
        };

        let error_relay = ContainerSpec {
            name: paths::ERROR_RELAY_CONTAINER_NAME.to_string(),
            image: SOCAT_IMAGE.to_string(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: vec![shell::happy_closer(&shell::relay_pipe_to_tcp_command(
                paths::STDERR_PIPE,
                caller_host,
                error_port,
            ))],
            env: vec![],
            mounts: vec![pipes_mount.clone(), termination_mount.clone()],
            working_dir: None,
        };

        let heartbeat_container = ContainerSpec {
            name: paths::HEARTBEAT_CONTAINER_NAME.to_string(),
            image: CURL_IMAGE.to_string(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: vec![shell::sad_closer(&shell::heartbeat_loop_command(
                &self.heartbeat.url(),
            ))],
            env: vec![],
            mounts: vec![termination_mount.clone()],
            working_dir: None,
        };

        let mut containers = vec![main_container, output_relay, error_relay, heartbeat_container];

        if child.uses_input {
            let input_relay = ContainerSpec {
                name: paths::INPUT_RELAY_CONTAINER_NAME.to_string(),
                image: SOCAT_IMAGE.to_string(),
                command: vec!["sh".to_string(), "-c".to_string()],
                args: vec![shell::happy_closer(&shell::relay_tcp_to_pipe_command(
                    paths::STDIN_PIPE,
                    paths::INPUT_RELAY_PORT,
                ))],
                env: vec![],
                mounts: vec![pipes_mount.clone(), termination_mount.clone()],
                working_dir: None,
            };
            containers.push(input_relay);
        }

        WorkloadSpec {
            name: child.workload_name.clone(),
            labels: vec![(
                paths::WORKLOAD_NAME_LABEL.to_string(),
                child.workload_name.clone(),
            )],
            restart_policy: RestartPolicy::Never,
            volumes: vec![
                VolumeSpec {
                    name: paths::PIPES_VOLUME.to_string(),
                },
                VolumeSpec {
                    name: paths::CONFIG_VOLUME.to_string(),
                },
                VolumeSpec {
                    name: paths::TERMINATION_VOLUME.to_string(),
                },
            ],
            init_containers: vec![init_container],
            containers,
            ttl_seconds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat() -> HeartbeatConfig {
        HeartbeatConfig {
            host_alias: "host.cluster.internal".to_string(),
            port: 9090,
        }
    }

    fn child(uses_input: bool) -> ChildSpec {
        ChildSpec {
            workload_name: "job-1".to_string(),
            image: "airbyte/source-faker:1.0".to_string(),
            entrypoint: "/airbyte/entrypoint.sh".to_string(),
            args: vec!["read".to_string()],
            uses_input,
            env: vec![],
        }
    }

    #[test]
    fn restart_policy_is_never() {
        let specifier = WorkloadSpecifier::new(heartbeat());
        let spec = specifier.build(&child(false), "10.0.0.5", 30001, 30002);
        assert_eq!(spec.restart_policy, RestartPolicy::Never);
    }

    #[test]
    fn input_relay_only_present_when_input_is_used() {
        let specifier = WorkloadSpecifier::new(heartbeat());

        let without_input = specifier.build(&child(false), "10.0.0.5", 30001, 30002);
        assert!(!without_input
            .containers
            .iter()
            .any(|c| c.name == paths::INPUT_RELAY_CONTAINER_NAME));

        let with_input = specifier.build(&child(true), "10.0.0.5", 30001, 30002);
        assert!(with_input
            .containers
            .iter()
            .any(|c| c.name == paths::INPUT_RELAY_CONTAINER_NAME));
    }

    #[test]
    fn three_scratch_volumes_present() {
        let specifier = WorkloadSpecifier::new(heartbeat());
        let spec = specifier.build(&child(false), "10.0.0.5", 30001, 30002);
        assert_eq!(spec.volumes.len(), 3);
        assert!(spec.volumes.iter().any(|v| v.name == paths::PIPES_VOLUME));
        assert!(spec.volumes.iter().any(|v| v.name == paths::CONFIG_VOLUME));
        assert!(spec
            .volumes
            .iter()
            .any(|v| v.name == paths::TERMINATION_VOLUME));
    }

    #[test]
    fn init_container_mounts_only_pipes_and_config() {
        let specifier = WorkloadSpecifier::new(heartbeat());
        let spec = specifier.build(&child(false), "10.0.0.5", 30001, 30002);
        let init = &spec.init_containers[0];
        assert_eq!(init.mounts.len(), 2);
        assert_eq!(init.working_dir.as_deref(), Some(paths::CONFIG_MOUNT));
    }

    #[test]
    fn relay_sidecars_target_caller_host_and_ports() {
        let specifier = WorkloadSpecifier::new(heartbeat());
        let spec = specifier.build(&child(false), "10.0.0.5", 30001, 30002);

        let output_relay = spec
            .containers
            .iter()
            .find(|c| c.name == paths::OUTPUT_RELAY_CONTAINER_NAME)
            .unwrap();
        assert!(output_relay.args[0].contains("10.0.0.5:30001"));

        let error_relay = spec
            .containers
            .iter()
            .find(|c| c.name == paths::ERROR_RELAY_CONTAINER_NAME)
            .unwrap();
        assert!(error_relay.args[0].contains("10.0.0.5:30002"));
    }

    #[test]
    fn heartbeat_sidecar_polls_configured_url() {
        let specifier = WorkloadSpecifier::new(heartbeat());
        let spec = specifier.build(&child(false), "10.0.0.5", 30001, 30002);
        let heartbeat_container = spec
            .containers
            .iter()
            .find(|c| c.name == paths::HEARTBEAT_CONTAINER_NAME)
            .unwrap();
        assert!(heartbeat_container.args[0].contains("host.cluster.internal:9090"));
    }
}
