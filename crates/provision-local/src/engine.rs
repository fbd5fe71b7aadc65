use provision_core::report::Report;
use provision_core::runner::RetryPolicy;
use provision_core::task::{Status, Task};
use std::io::Write;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `command` through the platform shell, retrying on a nonzero exit.
///
/// Every output line (stdout and stderr interleaved) is echoed to `out`
/// as it arrives. The report carries the lines of the last attempt only.
pub async fn execute(command: &str, policy: RetryPolicy, out: &mut (dyn Write + Send)) -> Report {
    let mut remaining = policy.effective_attempts();

    loop {
        remaining -= 1;

        let (success, output) = match attempt(command, out).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("failed to run command: {}", e);
                let _ = writeln!(out, "{}", message);
                (false, message.lines().map(str::to_string).collect())
            }
        };

        if success {
            return Report::new(Task::shell(command), Status::Success, output);
        }

        if remaining == 0 {
            return Report::new(Task::shell(command), Status::Failure, output);
        }

        info!("'{}' failed, {} attempts remaining", command, remaining);
        let _ = writeln!(
            out,
            "error, {} attempts remaining, will try again in {} seconds",
            remaining,
            policy.pause.as_secs_f64()
        );
        tokio::time::sleep(policy.pause).await;
    }
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// One spawn of the command. Returns whether it exited with 0, and its
/// right-trimmed output lines.
async fn attempt(command: &str, out: &mut (dyn Write + Send)) -> std::io::Result<(bool, Vec<String>)> {
    debug!("Local exec: {}", command);

    let mut child = shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let (mut stdout_buf, mut stderr_buf) = (Vec::new(), Vec::new());
    let (mut stdout_open, mut stderr_open) = (true, true);
    let mut output = Vec::new();

    while stdout_open || stderr_open {
        let line = tokio::select! {
            read = stdout.read_until(b'\n', &mut stdout_buf), if stdout_open => {
                stdout_open = read? > 0;
                take_line(&mut stdout_buf)
            }
            read = stderr.read_until(b'\n', &mut stderr_buf), if stderr_open => {
                stderr_open = read? > 0;
                take_line(&mut stderr_buf)
            }
        };

        if let Some(line) = line {
            writeln!(out, "{}", line)?;
            output.push(line);
        }
    }

    let status = child.wait().await?;
    debug!("'{}' exited with {}", command, status);
    Ok((status.success(), output))
}

/// Drains a raw line, decoding invalid UTF-8 lossily.
fn take_line(buf: &mut Vec<u8>) -> Option<String> {
    if buf.is_empty() {
        return None;
    }
    let line = String::from_utf8_lossy(buf).trim_end().to_string();
    buf.clear();
    Some(line)
}
