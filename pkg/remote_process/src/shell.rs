//! Builds the single-line shell fragments run inside the workload's
//! containers (spec.md §4.1). Each fragment is plain `sh -c` text; there is
//! no templating layer, matching the rest of this workspace's preference
//! for explicit `format!` string assembly over a templating dependency.

use crate::spec::paths;

/// Poll interval the init container uses while waiting for the upload
/// sentinel to appear.
pub const INIT_POLL_INTERVAL_SECS: u64 = 5;

/// Poll interval the happy/sad closer wrappers use while watching for
/// `/termination/main`.
pub const WATCHDOG_POLL_INTERVAL_SECS: u64 = 1;

/// Builds the init container's command.
///
/// Creates the FIFOs the primary and sidecars will use, then blocks until
/// the file injector drops the `FINISHED_UPLOADING` sentinel in
/// `/config`.
pub fn init_fragment(uses_input: bool) -> String {
    let mut mkfifo = format!(
        "mkfifo {stdout} {stderr}",
        stdout = paths::STDOUT_PIPE,
        stderr = paths::STDERR_PIPE,
    );
    if uses_input {
        mkfifo.push_str(&format!(" {stdin}", stdin = paths::STDIN_PIPE));
    }

    format!(
        "{mkfifo}; while [[ ! -f {sentinel} ]]; do sleep {interval}; done",
        mkfifo = mkfifo,
        sentinel = paths::FINISHED_UPLOADING,
        interval = INIT_POLL_INTERVAL_SECS,
    )
}

/// Builds the primary container's command.
///
/// Installs an exit trap that touches `/termination/main` unconditionally
/// (success or failure), then execs the resolved entrypoint with its
/// standard streams wired to the named pipes.
pub fn main_fragment(entrypoint: &str, args: &[String], uses_input: bool) -> String {
    let joined_args = args.join(" ");

    let stdin_redirect = if uses_input {
        format!("cat {stdin} | ", stdin = paths::STDIN_PIPE)
    } else {
        String::new()
    };

    format!(
        "trap 'touch {termination}' EXIT; {stdin_redirect}{entrypoint} {args} 1>{stdout} 2>{stderr}",
        termination = paths::MAIN_TERMINATION_FILE,
        stdin_redirect = stdin_redirect,
        entrypoint = entrypoint,
        args = joined_args,
        stdout = paths::STDOUT_PIPE,
        stderr = paths::STDERR_PIPE,
    )
}

/// Wraps `inner_command` so the sidecar follows the primary's exit: start
/// `inner_command` in the background, watch for `/termination/main`, kill
/// it when seen, and always exit zero so the sidecar's own death never
/// fails the workload.
///
/// Used for the output-relay, error-relay, and input-relay sidecars.
pub fn happy_closer(inner_command: &str) -> String {
    format!(
        "({inner}) & pid=$!; \
         (while [[ ! -f {termination} ]]; do sleep {interval}; done; kill $pid 2>/dev/null) & \
         wait $pid 2>/dev/null; \
         [[ -f {termination} ]]",
        inner = inner_command,
        termination = paths::MAIN_TERMINATION_FILE,
        interval = WATCHDOG_POLL_INTERVAL_SECS,
    )
}

/// Wraps `inner_command` so the sidecar fails if `inner_command` ever exits
/// on its own, but exits cleanly (without killing `inner_command`) once the
/// primary has terminated.
///
/// Used for the heartbeat-caller sidecar: the heartbeat loop is expected to
/// run forever, so the only way it legitimately stops is the primary
/// finishing first.
pub fn sad_closer(inner_command: &str) -> String {
    format!(
        "({inner}) & pid=$!; \
         (while [[ ! -f {termination} ]]; do \
             if ! kill -0 $pid 2>/dev/null; then exit 1; fi; \
             sleep {interval}; \
          done; exit 0) & \
         watcher=$!; \
         wait -n $pid $watcher; code=$?; \
         if [[ -f {termination} ]]; then exit 0; else exit $code; fi",
        inner = inner_command,
        termination = paths::MAIN_TERMINATION_FILE,
        interval = WATCHDOG_POLL_INTERVAL_SECS,
    )
}

/// The heartbeat loop itself (before being wrapped by `sad_closer`):
/// GET the given URL once a second, forever.
pub fn heartbeat_loop_command(url: &str) -> String {
    format!(
        "while true; do curl -sf -o /dev/null {url}; sleep 1; done",
        url = url,
    )
}

/// `socat` command relaying a container-local FIFO to a TCP endpoint
/// (output-relay / error-relay sidecars).
pub fn relay_pipe_to_tcp_command(pipe_path: &str, host: &str, port: u16) -> String {
    format!(
        "socat -u OPEN:{pipe},rdonly TCP:{host}:{port}",
        pipe = pipe_path,
        host = host,
        port = port,
    )
}

/// `socat` command listening for one inbound TCP connection and writing
/// everything it receives into a container-local FIFO (input-relay
/// sidecar).
pub fn relay_tcp_to_pipe_command(pipe_path: &str, listen_port: u16) -> String {
    format!(
        "socat -u TCP-LISTEN:{port},reuseaddr OPEN:{pipe},wronly",
        port = listen_port,
        pipe = pipe_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_fragment_creates_stdin_pipe_only_when_used() {
        let without_input = init_fragment(false);
        assert!(without_input.contains("mkfifo /pipes/stdout /pipes/stderr"));
        assert!(!without_input.contains("/pipes/stdin"));

        let with_input = init_fragment(true);
        assert!(with_input.contains("mkfifo /pipes/stdout /pipes/stderr /pipes/stdin"));
    }

    #[test]
    fn init_fragment_uses_well_formed_brackets() {
        let frag = init_fragment(false);
        assert!(frag.contains("[[ ! -f /config/FINISHED_UPLOADING ]]"));
        // Regression check for the historical typo: no "FILE]]" without a space.
        assert!(!frag.contains("UPLOADING]]"));
    }

    #[test]
    fn main_fragment_wires_stdin_only_when_used() {
        let args = vec!["--spec".to_string()];

        let frag = main_fragment("/airbyte/entrypoint.sh", &args, false);
        assert!(!frag.contains("cat /pipes/stdin"));
        assert!(frag.contains("trap 'touch /termination/main' EXIT"));
        assert!(frag.contains("/airbyte/entrypoint.sh --spec 1>/pipes/stdout 2>/pipes/stderr"));

        let frag_with_input = main_fragment("/airbyte/entrypoint.sh", &args, true);
        assert!(frag_with_input.contains("cat /pipes/stdin | /airbyte/entrypoint.sh"));
    }

    #[test]
    fn happy_closer_wraps_command_and_exits_zero_on_termination() {
        let wrapped = happy_closer("echo hi");
        assert!(wrapped.contains("(echo hi) & pid=$!"));
        assert!(wrapped.contains("kill $pid"));
        assert!(wrapped.ends_with("[[ -f /termination/main ]]"));
    }

    #[test]
    fn sad_closer_does_not_kill_the_inner_command() {
        let wrapped = sad_closer("curl http://x");
        assert!(!wrapped.contains("kill $pid"));
        assert!(wrapped.contains("exit 1"));
    }
}
