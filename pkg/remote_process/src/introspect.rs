//! Resolves an image's real entrypoint before any workload is scheduled
//! (spec.md §4.2).
//!
//! Some images don't declare a usable `ENTRYPOINT`/`CMD` pair directly; this
//! workspace's convention (mirrored from how images are probed elsewhere in
//! this corpus) is to run the image once with a marker command and read the
//! resolved entrypoint back off its log line.

use std::time::Duration;

use common::errors::*;

use crate::client::{ClusterClient, ProbePodSpec};
use crate::types::{ContainerState, Pod};

const PROBE_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_CONTAINER_NAME: &str = "probe";
const ENTRYPOINT_MARKER: &str = "AIRBYTE_ENTRYPOINT=";

/// Submits a one-off probe pod for `image`, waits for it to finish, and
/// parses the resolved entrypoint out of its log.
///
/// Fails if the pod never reaches a terminal state within two minutes, or if
/// its log never contains a non-empty `AIRBYTE_ENTRYPOINT=` line.
pub async fn resolve_entrypoint(
    cluster: &dyn ClusterClient,
    probe_pod_name: &str,
    image: &str,
) -> Result<String> {
    let spec = ProbePodSpec {
        name: probe_pod_name.to_string(),
        image: image.to_string(),
        command: vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("echo {}$AIRBYTE_ENTRYPOINT", ENTRYPOINT_MARKER),
        ],
    };

    cluster.create_probe_pod(&spec).await?;

    let pod: Pod = cluster
        .wait_for_pod_condition(probe_pod_name, PROBE_TIMEOUT, &|pod| pod.is_terminal())
        .await?;

    if let Some(status) = pod.container_statuses.first() {
        if let ContainerState::Terminated { exit_code } = status.state {
            if exit_code != 0 {
                return Err(format_err!(
                    "probe pod '{}' exited with code {}",
                    probe_pod_name,
                    exit_code
                ));
            }
        }
    }

    let log = cluster
        .get_pod_logs(probe_pod_name, PROBE_CONTAINER_NAME)
        .await?;

    parse_entrypoint(&log)
}

fn parse_entrypoint(log: &str) -> Result<String> {
    for line in log.lines() {
        if let Some(value) = line.strip_prefix(ENTRYPOINT_MARKER) {
            let value = value.trim();
            if value.is_empty() {
                return Err(format_err!(
                    "image declared an empty {} marker",
                    ENTRYPOINT_MARKER.trim_end_matches('=')
                ));
            }
            return Ok(value.to_string());
        }
    }

    Err(format_err!(
        "image's probe log never produced a {} marker",
        ENTRYPOINT_MARKER.trim_end_matches('=')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_marker_line() {
        let log = "some noise\nAIRBYTE_ENTRYPOINT=/airbyte/entrypoint.sh\nmore noise\n";
        assert_eq!(parse_entrypoint(log).unwrap(), "/airbyte/entrypoint.sh");
    }

    #[test]
    fn fails_when_marker_missing() {
        let log = "no marker here\n";
        assert!(parse_entrypoint(log).is_err());
    }

    #[test]
    fn fails_when_marker_value_empty() {
        let log = "AIRBYTE_ENTRYPOINT=\n";
        assert!(parse_entrypoint(log).is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let log = "AIRBYTE_ENTRYPOINT=  /bin/sh  \n";
        assert_eq!(parse_entrypoint(log).unwrap(), "/bin/sh");
    }
}
