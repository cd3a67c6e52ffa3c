// Shared child-process helper

use std::process::{Output, Stdio};

use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Run a command to completion with a deadline, capturing stdout/stderr.
/// The child is killed if the deadline elapses.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, String> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(Duration::from_secs(timeout_secs), command.output()).await {
        Ok(result) => result.map_err(|e| format!("failed to run {}: {}", program, e)),
        Err(_) => Err(format!("{} timed out after {}s", program, timeout_secs)),
    }
}
