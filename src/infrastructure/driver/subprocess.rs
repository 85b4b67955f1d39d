//! Optimization driver that runs as a child process.
//!
//! The driver reads one JSON [`OptimizationRequest`] on stdin, runs its
//! agent search loop, and writes the conversation trace to the path given in
//! `OPSEARCH_TRACE_PATH` (also present in the request as
//! `optimization_config.optimization_save_path`).

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, instrument, warn};

use crate::domain::models::DriverConfig;
use crate::domain::ports::{DriverError, OptimizationDriver, OptimizationRequest};

/// Environment variable carrying the trace path to the driver
pub const TRACE_PATH_ENV: &str = "OPSEARCH_TRACE_PATH";

/// Runs the external driver executable to completion
pub struct SubprocessDriver {
    config: DriverConfig,
}

impl SubprocessDriver {
    pub const fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, request: &OptimizationRequest) -> Result<Command, DriverError> {
        let program = self
            .config
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                DriverError::NotConfigured("optimization.driver.command is not set".to_string())
            })?;

        let mut cmd = Command::new(program);
        cmd.args(&self.config.args)
            .env(TRACE_PATH_ENV, request.trace_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref wd) = self.config.working_dir {
            cmd.current_dir(wd);
        }

        Ok(cmd)
    }
}

/// Delete a trace left by an earlier run. A missing file is fine.
async fn remove_stale_trace(path: &Path) -> Result<(), DriverError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale trace");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DriverError::SpawnFailed(format!(
            "cannot remove stale trace {}: {e}",
            path.display()
        ))),
    }
}

#[async_trait]
impl OptimizationDriver for SubprocessDriver {
    #[instrument(skip(self, request), fields(trace = %request.trace_path().display()))]
    async fn run(&self, request: &OptimizationRequest) -> Result<(), DriverError> {
        let payload = serde_json::to_vec(request)?;
        let trace_path = request.trace_path().clone();

        if let Some(parent) = trace_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DriverError::SpawnFailed(format!("cannot create {}: {e}", parent.display())))?;
        }

        let mut cmd = self.build_command(request)?;
        remove_stale_trace(&trace_path).await?;
        let mut child = cmd
            .spawn()
            .map_err(|e| DriverError::SpawnFailed(e.to_string()))?;

        info!(pid = child.id(), "optimization driver started");

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::SpawnFailed("Failed to get stdin handle".to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::SpawnFailed("Failed to get stdout handle".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DriverError::SpawnFailed("Failed to get stderr handle".to_string()))?;

        let write_request = async move {
            // A driver that never reads stdin closes the pipe early; that is not fatal.
            if let Err(e) = stdin.write_all(&payload).await {
                debug!(error = %e, "driver closed stdin before reading the request");
            }
            drop(stdin);
        };

        let run = async {
            let mut out = String::new();
            let mut err = String::new();
            let ((), out_res, err_res, status) = tokio::join!(
                write_request,
                stdout.read_to_string(&mut out),
                stderr.read_to_string(&mut err),
                child.wait()
            );
            out_res.map_err(|e| DriverError::SpawnFailed(format!("Failed to read stdout: {e}")))?;
            err_res.map_err(|e| DriverError::SpawnFailed(format!("Failed to read stderr: {e}")))?;
            let status = status
                .map_err(|e| DriverError::SpawnFailed(format!("Failed to wait for driver: {e}")))?;
            Ok::<_, DriverError>((status, out, err))
        };

        let (status, out, err) = match self.config.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| DriverError::Timeout(secs))??,
            None => run.await?,
        };

        for line in out.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "opsearch::driver", "{line}");
        }

        if !status.success() {
            warn!(%status, "optimization driver failed");
            return Err(DriverError::Failed {
                status: status.to_string(),
                stderr: err.trim().to_string(),
            });
        }

        if !trace_path.is_file() {
            return Err(DriverError::MissingTrace(trace_path));
        }

        info!("optimization driver finished");
        Ok(())
    }
}
