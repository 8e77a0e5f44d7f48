//! Handlers backed by an external shell command.
//!
//! Each invocation spawns `sh -c <command>`, writes the payload as JSON to
//! stdin and reads the result from stdout:
//!
//! - exit 0, empty stdout → `null`
//! - exit 0, JSON stdout → that value
//! - exit 0, non-JSON stdout → the trimmed text as a JSON string
//! - non-zero exit → error carrying stderr
//! - timeout → error, the child is killed

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Stdio,
    time::{Duration, Instant},
};

use {
    anyhow::{Context, Result, bail},
    async_trait::async_trait,
    herald_common::Handler,
    serde_json::Value,
    tokio::{io::AsyncWriteExt, process::Command},
    tracing::debug,
};

use crate::manifest::ShellHandlerConfig;

/// A handler that runs a shell command per invocation.
#[derive(Debug, Clone)]
pub struct ShellHandler {
    handler_name: String,
    command: String,
    timeout: Duration,
    env: HashMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl ShellHandler {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        timeout: Duration,
        env: HashMap<String, String>,
    ) -> Self {
        Self {
            handler_name: name.into(),
            command: command.into(),
            timeout,
            env,
            working_dir: None,
        }
    }

    /// Build from an inline manifest declaration. Relative script paths in
    /// the command resolve against `working_dir`.
    pub fn from_config(
        name: impl Into<String>,
        config: &ShellHandlerConfig,
        working_dir: Option<&Path>,
    ) -> Self {
        let mut handler = Self::new(
            name,
            config.command.clone(),
            Duration::from_secs(config.timeout),
            config.env.clone(),
        );
        handler.working_dir = working_dir.map(Path::to_path_buf);
        handler
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Handler for ShellHandler {
    fn name(&self) -> &str {
        &self.handler_name
    }

    async fn handle(&self, payload: &Value) -> Result<Value> {
        let payload_json =
            serde_json::to_string(payload).context("failed to serialize handler payload")?;

        debug!(
            handler = %self.handler_name,
            command = %self.command,
            payload_len = payload_json.len(),
            "spawning shell handler"
        );

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn handler command: {}", self.command))?;

        // The child may exit without reading stdin. Dropping the pipe at the
        // end of the write closes it so readers see EOF.
        let stdin = child.stdin.take();
        let write = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(payload_json.as_bytes()).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };
        // Stdin and the wait share one deadline; a child that never drains
        // its stdin must still time out.
        let run = async {
            let (written, output) = tokio::join!(write, child.wait_with_output());
            written?;
            output
        };

        let started = Instant::now();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .with_context(|| {
                format!(
                    "handler '{}' timed out after {:?}",
                    self.handler_name, self.timeout
                )
            })?
            .with_context(|| format!("handler '{}' failed to complete", self.handler_name))?;

        #[cfg(feature = "metrics")]
        herald_metrics::histogram!(
            herald_metrics::plugins::SHELL_DURATION_SECONDS,
            herald_metrics::labels::HANDLER => self.handler_name.clone()
        )
        .record(started.elapsed().as_secs_f64());

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!(
            handler = %self.handler_name,
            exit_code = output.status.code(),
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "shell handler completed"
        );

        if !output.status.success() {
            match output.status.code() {
                Some(code) => bail!(
                    "handler '{}' exited with code {}: {}",
                    self.handler_name,
                    code,
                    stderr.trim()
                ),
                None => bail!("handler '{}' was terminated by a signal", self.handler_name),
            }
        }

        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(stdout).unwrap_or_else(|_| Value::String(stdout.to_string())))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn shell(command: &str) -> ShellHandler {
        ShellHandler::new("test", command, Duration::from_secs(5), HashMap::new())
    }

    #[tokio::test]
    async fn empty_stdout_is_null() {
        let out = shell("exit 0").handle(&Value::Null).await.unwrap();
        assert_eq!(out, Value::Null);
    }

    #[tokio::test]
    async fn json_stdout_is_parsed() {
        let out = shell(r#"echo '{"content":"pong"}'"#)
            .handle(&Value::Null)
            .await
            .unwrap();
        assert_eq!(out, json!({"content": "pong"}));
    }

    #[tokio::test]
    async fn plain_stdout_becomes_string() {
        let out = shell("echo hello there").handle(&Value::Null).await.unwrap();
        assert_eq!(out, json!("hello there"));
    }

    #[tokio::test]
    async fn payload_arrives_on_stdin() {
        let out = shell("cat").handle(&json!({"user": "42"})).await.unwrap();
        assert_eq!(out, json!({"user": "42"}));
    }

    #[tokio::test]
    async fn nonzero_exit_is_error_with_stderr() {
        let err = shell("echo 'no permission' >&2; exit 3")
            .handle(&Value::Null)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("code 3"), "{message}");
        assert!(message.contains("no permission"), "{message}");
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let handler = ShellHandler::new(
            "sleepy",
            "sleep 60",
            Duration::from_millis(100),
            HashMap::new(),
        );
        let err = handler.handle(&Value::Null).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn timeout_covers_a_payload_the_child_never_reads() {
        let handler = ShellHandler::new(
            "stuck",
            "sleep 8",
            Duration::from_millis(200),
            HashMap::new(),
        );
        let payload = Value::String("x".repeat(1024 * 1024));

        let started = Instant::now();
        let err = handler.handle(&payload).await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn large_payload_is_delivered_in_full() {
        let payload = Value::String("y".repeat(256 * 1024));
        let out = shell("cat").handle(&payload).await.unwrap();
        assert_eq!(out, payload);
    }

    #[tokio::test]
    async fn env_and_working_dir_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("greeting.txt"), "hi").unwrap();
        let config = ShellHandlerConfig {
            command: r#"printf '{"greeting":"%s","name":"%s"}' "$(cat greeting.txt)" "$WHO""#
                .into(),
            timeout: 5,
            env: HashMap::from([("WHO".to_string(), "herald".to_string())]),
        };
        let handler = ShellHandler::from_config("greet", &config, Some(dir.path()));
        assert_eq!(handler.timeout(), Duration::from_secs(5));

        let out = handler.handle(&Value::Null).await.unwrap();
        assert_eq!(out, json!({"greeting": "hi", "name": "herald"}));
    }
}
