//! Headless office-suite invocation.

use crate::error::ConversionError;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Result of a converter run that finished within its time budget.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Turns a local document into a PDF inside `output_dir`.
///
/// Implementations must bound their own run time and report an overrun as
/// [`ConversionError::Timeout`]. A non-zero exit is not an error at this level; it is
/// returned in [`ConversionOutput`] for the caller to classify.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<ConversionOutput, ConversionError>;

    /// Whether the converter looks usable on this host.
    fn is_available(&self) -> bool;
}

fn validate_binary(binary: &str) -> Result<()> {
    if binary.trim().is_empty() {
        return Err(anyhow!("Converter path is empty"));
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if binary.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", binary));
    }

    if binary.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", binary));
    }

    Ok(())
}

/// Resolve `binary` the way the OS would launch it: as given when it contains a path
/// separator, otherwise through `PATH`.
fn resolve_binary(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|p| p.is_file())
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        if let Err(e) = reader.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Failed to read converter output");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// SIGKILL the process group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!(pid, error = %e, "Converter process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// LibreOffice `soffice` running headless:
/// `soffice --headless --convert-to pdf --outdir <dir> <input>`.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    binary: String,
    timeout: Duration,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Result<Self> {
        let binary = binary.into();
        validate_binary(&binary).context("Invalid converter path")?;

        Ok(Self { binary, timeout })
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Location of the executable, if it can be found.
    pub fn resolve(&self) -> Option<PathBuf> {
        resolve_binary(&self.binary)
    }

    fn command(&self, input_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(output_dir)
            .arg(input_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down everything the converter started.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

#[async_trait]
impl DocumentConverter for SofficeConverter {
    #[tracing::instrument(skip(self), fields(binary = %self.binary))]
    async fn convert(
        &self,
        input_path: &Path,
        output_dir: &Path,
    ) -> Result<ConversionOutput, ConversionError> {
        let start = Instant::now();

        let mut child = self
            .command(input_path, output_dir)
            .spawn()
            .map_err(|e| {
                ConversionError::Unexpected(format!(
                    "Failed to launch converter '{}': {}",
                    self.binary, e
                ))
            })?;

        // Captured before waiting: the id is gone once the child is reaped.
        let pid = child.id();
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));
        let stdout_abort = stdout_task.abort_handle();
        let stderr_abort = stderr_task.abort_handle();

        // One deadline covers the exit and the end of both output streams, since a
        // helper process that inherited the pipes can hold them open after the child exits.
        let outcome = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            (status, stdout, stderr)
        })
        .await;

        let (status, stdout, stderr) = match outcome {
            Ok((Ok(status), stdout, stderr)) => (status, stdout, stderr),
            Ok((Err(e), _, _)) => {
                return Err(ConversionError::Unexpected(format!(
                    "Failed to wait for converter: {}",
                    e
                )));
            }
            Err(_) => {
                stdout_abort.abort();
                stderr_abort.abort();
                kill_process_group(pid);
                if let Err(e) = child.kill().await {
                    tracing::debug!(error = %e, "Converter already exited");
                }
                tracing::error!(
                    timeout_secs = self.timeout.as_secs(),
                    "Converter timed out and was killed"
                );
                return Err(ConversionError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let duration = start.elapsed();

        tracing::debug!(
            exit_code = ?status.code(),
            duration_ms = duration.as_secs_f64() * 1000.0,
            "Converter finished"
        );

        Ok(ConversionOutput {
            success: status.success(),
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
        })
    }

    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(SofficeConverter::new("soffice; rm -rf /", Duration::from_secs(60)).is_err());
        assert!(SofficeConverter::new("$(whoami)", Duration::from_secs(60)).is_err());
        assert!(SofficeConverter::new("../bin/soffice", Duration::from_secs(60)).is_err());
        assert!(SofficeConverter::new("", Duration::from_secs(60)).is_err());
    }

    #[test]
    fn accepts_plain_names_and_paths() {
        let converter = SofficeConverter::new("soffice", Duration::from_secs(60)).unwrap();
        assert_eq!(converter.binary(), "soffice");
        assert_eq!(converter.timeout(), Duration::from_secs(60));
        assert!(SofficeConverter::new("/usr/bin/soffice", Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let converter =
            SofficeConverter::new("docpress-no-such-converter", Duration::from_secs(1)).unwrap();
        assert!(!converter.is_available());

        let converter =
            SofficeConverter::new("/nonexistent/soffice", Duration::from_secs(1)).unwrap();
        assert!(!converter.is_available());
    }

    #[tokio::test]
    async fn launch_failure_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let converter =
            SofficeConverter::new("/nonexistent/soffice", Duration::from_secs(1)).unwrap();

        let err = converter
            .convert(&dir.path().join("in.docx"), dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Unexpected");
        assert!(err.to_string().contains("/nonexistent/soffice"));
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for the office suite.
        /// Arguments arrive as: --headless --convert-to pdf --outdir $5 $6
        fn script(dir: &Path, body: &str) -> String {
            let path = dir.join("fake-soffice");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[tokio::test]
        async fn successful_run_captures_output() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(
                dir.path(),
                r#"echo "convert $6 as pdf"
base=$(basename "$6")
printf '%%PDF-1.7' > "$5/${base%.*}.pdf""#,
            );
            let input = dir.path().join("job_input.docx");
            std::fs::write(&input, b"doc").unwrap();

            let converter = SofficeConverter::new(bin, Duration::from_secs(10)).unwrap();
            assert!(converter.is_available());

            let output = converter.convert(&input, dir.path()).await.unwrap();
            assert!(output.success);
            assert_eq!(output.exit_code, Some(0));
            assert!(output.stdout.contains("convert"));
            assert!(dir.path().join("job_input.pdf").exists());
        }

        #[tokio::test]
        async fn non_zero_exit_is_reported_with_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "echo 'Error: source file could not be loaded' >&2\nexit 81");

            let converter = SofficeConverter::new(bin, Duration::from_secs(10)).unwrap();
            let output = converter
                .convert(&dir.path().join("in.docx"), dir.path())
                .await
                .unwrap();
            assert!(!output.success);
            assert_eq!(output.exit_code, Some(81));
            assert!(output.stderr.contains("could not be loaded"));
        }

        #[tokio::test]
        async fn hung_converter_is_killed_at_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "exec sleep 30");

            let converter = SofficeConverter::new(bin, Duration::from_secs(1)).unwrap();
            let start = Instant::now();
            let err = converter
                .convert(&dir.path().join("in.docx"), dir.path())
                .await
                .unwrap_err();

            assert!(matches!(err, ConversionError::Timeout { seconds: 1 }));
            assert!(start.elapsed() < Duration::from_secs(10));
        }

        #[tokio::test]
        async fn background_helper_holding_pipes_cannot_outlast_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let bin = script(dir.path(), "(sleep 3; touch \"$5/straggler\") &\nexit 0");

            let converter = SofficeConverter::new(bin, Duration::from_secs(1)).unwrap();
            let start = Instant::now();
            let err = converter
                .convert(&dir.path().join("in.docx"), dir.path())
                .await
                .unwrap_err();

            assert!(matches!(err, ConversionError::Timeout { seconds: 1 }));
            assert!(start.elapsed() < Duration::from_millis(2500));

            // The helper was in the converter's process group and died with it.
            tokio::time::sleep(Duration::from_secs(4)).await;
            assert!(!dir.path().join("straggler").exists());
        }
    }
}
