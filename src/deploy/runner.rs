//! Deploy pipeline execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::process::Command;

use crate::config::DeployConfig;
use crate::error::SpacehubError;
use crate::Result;

use super::log::DeployLog;

/// Longest command output fragment carried into the deploy log.
const OUTPUT_SNIPPET_LEN: usize = 500;

/// Runs the configured deploy command list, one deploy at a time.
///
/// Triggering is fire-and-forget: the caller gets an immediate answer
/// (started / already running) and the pipeline itself runs on a spawned
/// task, reporting only through the deploy log.
pub struct DeployRunner {
    commands: Vec<String>,
    working_dir: PathBuf,
    continue_on_error: bool,
    log: DeployLog,
    active: AtomicBool,
}

impl DeployRunner {
    pub fn new(config: &DeployConfig) -> Result<Self> {
        if config.commands.is_empty() {
            return Err(SpacehubError::Config(
                "deploy.commands must not be empty".to_string(),
            ));
        }
        Ok(Self {
            commands: config.commands.clone(),
            working_dir: PathBuf::from(&config.working_dir),
            continue_on_error: config.continue_on_error,
            log: DeployLog::new(&config.log_dir)?,
            active: AtomicBool::new(false),
        })
    }

    pub fn log(&self) -> &DeployLog {
        &self.log
    }

    /// Whether a pipeline is currently running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start the pipeline on a background task unless one is already running.
    ///
    /// Returns `false` without side effects (beyond a log line) when a deploy
    /// is in flight. The gate is a compare-exchange, so two concurrent
    /// triggers can never both start.
    pub fn try_trigger(self: Arc<Self>, reason: &str) -> bool {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.log
                .info(&format!("Deploy request ignored, already running ({reason})"));
            return false;
        }

        self.log.info(&format!("Deployment triggered: {reason}"));
        tokio::spawn(async move {
            self.run_pipeline().await;
            self.active.store(false, Ordering::SeqCst);
        });
        true
    }

    async fn run_pipeline(&self) {
        let total = self.commands.len();
        for (i, command) in self.commands.iter().enumerate() {
            self.log
                .info(&format!("Step {}/{}: {}", i + 1, total, command));

            match self.run_step(command).await {
                Ok(output) => {
                    if !output.is_empty() {
                        self.log.info(&output);
                    }
                }
                Err(message) => {
                    self.log.error(&message);
                    if !self.continue_on_error {
                        self.log.error("Deployment aborted");
                        return;
                    }
                }
            }
        }
        self.log.info("Deployment finished successfully");
    }

    /// Run one shell command, returning a trimmed stdout snippet on success
    /// or a log-ready message on failure.
    async fn run_step(&self, command: &str) -> std::result::Result<String, String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("Failed to spawn '{command}': {e}"))?;

        if output.status.success() {
            Ok(snippet(&output.stdout))
        } else {
            let stderr = snippet(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            Err(format!("'{command}' exited with {code}: {stderr}"))
        }
    }
}

/// Trimmed, length-capped, single-spaced command output for the log.
fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.len() > OUTPUT_SNIPPET_LEN {
        let mut end = OUTPUT_SNIPPET_LEN;
        while !joined.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &joined[..end])
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn runner_with(commands: &[&str], continue_on_error: bool) -> (TempDir, Arc<DeployRunner>) {
        let tmp = TempDir::new().unwrap();
        let config = DeployConfig {
            enabled: true,
            branch: "main".to_string(),
            working_dir: tmp.path().to_string_lossy().into_owned(),
            commands: commands.iter().map(|c| c.to_string()).collect(),
            log_dir: tmp.path().join("deploy-logs").to_string_lossy().into_owned(),
            continue_on_error,
            webhook_secret: String::new(),
        };
        let runner = Arc::new(DeployRunner::new(&config).unwrap());
        (tmp, runner)
    }

    async fn wait_idle(runner: &Arc<DeployRunner>) {
        for _ in 0..200 {
            if !runner.is_active() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("deploy did not finish in time");
    }

    #[test]
    fn test_empty_commands_rejected() {
        let config = DeployConfig {
            commands: vec![],
            ..DeployConfig::default()
        };
        assert!(DeployRunner::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_pipeline_runs_all_steps() {
        let (_tmp, runner) = runner_with(&["echo step-one", "echo step-two"], false);
        assert!(runner.clone().try_trigger("test"));
        wait_idle(&runner).await;

        let lines = runner.log().read_latest().unwrap();
        let all = lines.join("\n");
        assert!(all.contains("step-one"));
        assert!(all.contains("step-two"));
        assert!(all.contains("Deployment finished successfully"));
    }

    #[tokio::test]
    async fn test_pipeline_aborts_on_failure() {
        let (_tmp, runner) = runner_with(&["false", "echo never-reached"], false);
        assert!(runner.clone().try_trigger("test"));
        wait_idle(&runner).await;

        let all = runner.log().read_latest().unwrap().join("\n");
        assert!(all.contains("Deployment aborted"));
        assert!(!all.contains("never-reached"));
        assert!(!all.contains("Deployment finished successfully"));
    }

    #[tokio::test]
    async fn test_pipeline_continues_when_configured() {
        let (_tmp, runner) = runner_with(&["false", "echo still-here"], true);
        assert!(runner.clone().try_trigger("test"));
        wait_idle(&runner).await;

        let all = runner.log().read_latest().unwrap().join("\n");
        assert!(all.contains("still-here"));
        assert!(all.contains("Deployment finished successfully"));
    }

    #[tokio::test]
    async fn test_second_trigger_rejected_while_running() {
        let (_tmp, runner) = runner_with(&["sleep 0.5"], false);
        assert!(runner.clone().try_trigger("first"));
        assert!(!runner.clone().try_trigger("second"));
        wait_idle(&runner).await;
        // Gate reopens once the pipeline ends
        assert!(runner.clone().try_trigger("third"));
        wait_idle(&runner).await;
    }

    #[tokio::test]
    async fn test_step_runs_in_working_dir() {
        let (tmp, runner) = runner_with(&["touch marker.txt"], false);
        assert!(runner.clone().try_trigger("test"));
        wait_idle(&runner).await;
        assert!(tmp.path().join("marker.txt").exists());
    }

    #[test]
    fn test_snippet_caps_length() {
        let long = "x".repeat(2000);
        let s = snippet(long.as_bytes());
        assert!(s.len() <= OUTPUT_SNIPPET_LEN + 3);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn test_snippet_collapses_whitespace() {
        assert_eq!(snippet(b"a\n  b\t c\n"), "a b c");
    }
}
