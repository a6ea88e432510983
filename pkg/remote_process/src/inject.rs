//! Pushes config files into the running init container before it's allowed
//! to exit (spec.md §4.4).
//!
//! The init container blocks on the `FINISHED_UPLOADING` sentinel (see
//! `crate::shell::init_fragment`); this module is the other half of that
//! handshake — it waits for the init container to actually be running, then
//! streams every file across before dropping the sentinel itself.

use std::time::Duration;

use common::errors::*;

use crate::client::ClusterClient;
use crate::spec::paths;
use crate::types::FileMapping;

const INIT_RUNNING_TIMEOUT: Duration = Duration::from_secs(300);

/// Waits for `pod_name`'s init container to be running, uploads every file
/// in `files` in insertion order, and only then uploads the empty
/// `FINISHED_UPLOADING` sentinel.
pub async fn inject_files(
    cluster: &dyn ClusterClient,
    pod_name: &str,
    init_container_name: &str,
    files: &FileMapping,
) -> Result<()> {
    cluster
        .wait_for_pod_condition(pod_name, INIT_RUNNING_TIMEOUT, &|pod| {
            pod.has_running_init_container()
        })
        .await?;

    for (name, contents) in files.iter() {
        let path = format!("{}/{}", paths::CONFIG_MOUNT, name);
        cluster
            .upload_file(pod_name, init_container_name, &path, contents)
            .await?;
    }

    cluster
        .upload_file(pod_name, init_container_name, paths::FINISHED_UPLOADING, b"")
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryClusterClient;
    use crate::types::{ContainerState, ContainerStatus, Pod};

    #[testcase]
    async fn uploads_every_file_before_the_sentinel() -> Result<()> {
        let cluster = InMemoryClusterClient::new();
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                init_container_statuses: vec![ContainerStatus {
                    name: paths::INIT_CONTAINER_NAME.to_string(),
                    state: ContainerState::Running,
                    ready: false,
                }],
                ..Default::default()
            })
            .await;

        let mut files = FileMapping::new();
        files.insert("config.json".to_string(), b"{}".to_vec());
        files.insert("catalog.json".to_string(), b"[]".to_vec());

        inject_files(&cluster, "job-1", paths::INIT_CONTAINER_NAME, &files).await?;

        let uploaded = cluster.uploaded_paths("job-1").await;
        assert_eq!(
            uploaded,
            vec![
                "/config/config.json".to_string(),
                "/config/catalog.json".to_string(),
                paths::FINISHED_UPLOADING.to_string(),
            ]
        );

        Ok(())
    }

    #[testcase]
    async fn fails_if_init_container_never_runs() -> Result<()> {
        let cluster = InMemoryClusterClient::new();
        cluster
            .seed_pod(Pod {
                name: "job-1".to_string(),
                ..Default::default()
            })
            .await;

        let files = FileMapping::new();
        let result = inject_files(&cluster, "job-1", paths::INIT_CONTAINER_NAME, &files).await;
        assert!(result.is_err());

        Ok(())
    }
}
