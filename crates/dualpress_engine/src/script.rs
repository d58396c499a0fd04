use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use dualpress_logging::{dp_debug, dp_info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::estimate::OutputProgress;
use crate::launcher::line_event;
use crate::{FailureKind, JobId, JobLauncher, LaunchRequest, ProgressSink};

/// Environment variable carrying the parallelism degree to the script.
pub const JOBS_ENV_VAR: &str = "DUAL_COMPRESSOR_JOBS";

#[derive(Debug, Clone)]
pub struct ScriptSettings {
    pub script_path: PathBuf,
    /// Runs the script through this program (e.g. `bash`) instead of
    /// executing it directly.
    pub interpreter: Option<PathBuf>,
    pub jobs_env_var: String,
    /// Tracks that progress estimated from plain output is reported for.
    pub tracks: [String; 2],
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            script_path: PathBuf::from("bin/dual_output_image_compressor.sh"),
            interpreter: None,
            jobs_env_var: JOBS_ENV_VAR.to_string(),
            tracks: ["jpeg".to_string(), "png".to_string()],
        }
    }
}

impl ScriptSettings {
    /// The script to run. A relative path missing from the working directory
    /// is looked up next to the running executable.
    pub fn resolved_script_path(&self) -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        resolve_script_path(&self.script_path, exe_dir.as_deref())
    }
}

fn resolve_script_path(path: &Path, exe_dir: Option<&Path>) -> PathBuf {
    if path.is_absolute() || path.is_file() {
        return path.to_path_buf();
    }
    match exe_dir.map(|dir| dir.join(path)) {
        Some(beside_exe) if beside_exe.is_file() => beside_exe,
        _ => path.to_path_buf(),
    }
}

/// Launches the compressor script as a child process and streams its
/// stdout and stderr line by line.
#[derive(Debug, Clone)]
pub struct ScriptLauncher {
    settings: ScriptSettings,
}

impl ScriptLauncher {
    pub fn new(settings: ScriptSettings) -> Self {
        Self { settings }
    }

    fn build_command(&self, script_path: &Path, request: &LaunchRequest) -> Command {
        let mut cmd = match &self.settings.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(script_path);
                cmd
            }
            None => Command::new(script_path),
        };
        cmd.arg(&request.input_dir)
            .arg(&request.output_dir)
            .arg(&request.size_arg)
            .env(&self.settings.jobs_env_var, request.parallelism.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl JobLauncher for ScriptLauncher {
    async fn run(
        &self,
        job_id: JobId,
        request: &LaunchRequest,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<(), FailureKind> {
        let script_path = self.settings.resolved_script_path();
        if !script_path.is_file() {
            return Err(FailureKind::ScriptNotFound(script_path));
        }
        if !request.input_dir.is_dir() {
            return Err(FailureKind::InputMissing(request.input_dir.clone()));
        }

        let mut child = self
            .build_command(&script_path, request)
            .spawn()
            .map_err(|err| FailureKind::Spawn(err.to_string()))?;
        dp_info!(
            "Spawned {:?} for job {} (pid {:?})",
            script_path,
            job_id,
            child.id()
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FailureKind::Io("stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FailureKind::Io("stderr not captured".into()))?;
        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();
        let mut estimate = OutputProgress::new(self.settings.tracks.clone());
        let mut stdout_open = true;
        let mut stderr_open = true;

        while stdout_open || stderr_open {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(terminate(&mut child).await);
                }
                line = stdout.next_line(), if stdout_open => match line {
                    Ok(Some(line)) => forward_line(sink, &mut estimate, job_id, &line),
                    Ok(None) => stdout_open = false,
                    Err(err) => return Err(FailureKind::Io(err.to_string())),
                },
                line = stderr.next_line(), if stderr_open => match line {
                    Ok(Some(line)) => forward_line(sink, &mut estimate, job_id, &line),
                    Ok(None) => stderr_open = false,
                    Err(err) => return Err(FailureKind::Io(err.to_string())),
                },
            }
        }

        let waited = tokio::select! {
            _ = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        match waited {
            Some(status) => exit_outcome(status.map_err(|err| FailureKind::Io(err.to_string()))?),
            None => Err(terminate(&mut child).await),
        }
    }
}

fn forward_line(
    sink: &dyn ProgressSink,
    estimate: &mut OutputProgress,
    job_id: JobId,
    line: &str,
) {
    let Some(event) = line_event(job_id, line) else {
        return;
    };
    let estimated = estimate.observe(&event);
    sink.emit(event);
    for event in estimated {
        sink.emit(event);
    }
}

async fn terminate(child: &mut Child) -> FailureKind {
    dp_debug!("Killing compressor process {:?}", child.id());
    let _ = child.start_kill();
    let _ = child.wait().await;
    FailureKind::Cancelled
}

fn exit_outcome(status: ExitStatus) -> Result<(), FailureKind> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(FailureKind::ExitCode(code)),
        None => Err(FailureKind::Terminated),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn relative_script_is_found_next_to_the_executable() {
        let exe_dir = TempDir::new().unwrap();
        let relative = Path::new("bin/dualpress-test-compressor.sh");
        fs::create_dir(exe_dir.path().join("bin")).unwrap();
        fs::write(exe_dir.path().join(relative), "exit 0\n").unwrap();

        assert_eq!(
            resolve_script_path(relative, Some(exe_dir.path())),
            exe_dir.path().join(relative)
        );
    }

    #[test]
    fn unresolved_script_path_is_kept_as_given() {
        let exe_dir = TempDir::new().unwrap();
        let relative = Path::new("bin/dualpress-test-compressor.sh");

        assert_eq!(
            resolve_script_path(relative, Some(exe_dir.path())),
            relative.to_path_buf()
        );
        assert_eq!(resolve_script_path(relative, None), relative.to_path_buf());
        assert_eq!(
            resolve_script_path(Path::new("/opt/compress.sh"), Some(exe_dir.path())),
            PathBuf::from("/opt/compress.sh")
        );
    }
}
