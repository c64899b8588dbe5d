use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;

use crate::foundation::error::{WarpError, WarpResult};

/// Return `true` when `tool -version` can be invoked.
pub fn is_tool_available(tool: &Path) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `cmd` to completion and fail with its stderr when it exits unsuccessfully.
pub(crate) fn run_checked(cmd: &mut Command, what: &str) -> WarpResult<Output> {
    tracing::trace!(?cmd, "spawning {what}");
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| WarpError::media(format!("failed to run {what} (is it on PATH?): {e}")))?;
    if !out.status.success() {
        return Err(WarpError::media(format!(
            "{what} exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(out)
}

/// Background reader that keeps a child's stderr pipe from filling up.
pub(crate) struct StderrDrain(Option<JoinHandle<std::io::Result<Vec<u8>>>>);

impl StderrDrain {
    pub(crate) fn spawn(child: &mut Child) -> Self {
        let handle = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf)?;
                Ok(buf)
            })
        });
        Self(handle)
    }

    /// Collected stderr text; empty when the pipe was not captured.
    pub(crate) fn collect(&mut self) -> WarpResult<String> {
        let Some(handle) = self.0.take() else {
            return Ok(String::new());
        };
        let bytes = handle
            .join()
            .map_err(|_| WarpError::media("stderr drain thread panicked"))?
            .map_err(|e| WarpError::media(format!("stderr read failed: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_owned())
    }
}

/// Wait for `child` and turn a non-zero exit into an error carrying its stderr.
pub(crate) fn wait_checked(
    child: &mut Child,
    drain: &mut StderrDrain,
    what: &str,
) -> WarpResult<()> {
    let status = child
        .wait()
        .map_err(|e| WarpError::media(format!("failed to wait for {what}: {e}")))?;
    let stderr = drain.collect()?;
    if !status.success() {
        return Err(WarpError::media(format!(
            "{what} exited with status {status}: {stderr}"
        )));
    }
    Ok(())
}

/// Kill a still-running child and reap it. Errors are irrelevant at this point.
pub(crate) fn kill_quietly(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Decode little-endian `f32` samples.
pub(crate) fn f32le_to_vec(bytes: &[u8]) -> WarpResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(WarpError::media(
            "raw audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Parse ffprobe-style rationals (`30000/1001`) or plain decimals.
pub(crate) fn parse_rate(s: &str) -> Option<f64> {
    let v = match s.split_once('/') {
        Some((n, d)) => {
            let n: f64 = n.trim().parse().ok()?;
            let d: f64 = d.trim().parse().ok()?;
            if d == 0.0 {
                return None;
            }
            n / d
        }
        None => s.trim().parse().ok()?,
    };
    (v.is_finite() && v > 0.0).then_some(v)
}

#[cfg(test)]
#[path = "../../tests/unit/media/process.rs"]
mod tests;
