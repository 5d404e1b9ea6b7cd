use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{EngineError, Failure, Invocation, Outcome, RecommendationEngine};
use crate::config::EngineConfig;

/// Runs the recommendation engine as a child process, one per request.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    command: String,
    leading_args: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(command: impl Into<String>, leading_args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            leading_args,
            workdir: None,
            timeout,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new(config.command.clone(), config.args.clone(), config.timeout());
        engine.workdir = config.workdir.as_ref().map(PathBuf::from);
        engine
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command_for(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.leading_args)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl RecommendationEngine for ProcessEngine {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome, EngineError> {
        let id = Uuid::new_v4();
        let started = Instant::now();
        debug!(invocation = %id, command = %self.command, args = ?invocation.args(), "starting engine");

        let mut child = match self.command_for(invocation).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(invocation = %id, command = %self.command, error = %e, "engine failed to start");
                return Ok(Failure::Start(e.to_string()).into());
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained while waiting, so a chatty engine cannot
        // block on a full pipe buffer.
        let finished = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        let outcome = match finished {
            Ok(collected) => {
                let (status, stdout, stderr) = collected?;
                Outcome::from_exit(status.code(), &stdout, &stderr)
            }
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    debug!(invocation = %id, error = %e, "failed to signal timed out engine");
                }
                Failure::Timeout.into()
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if outcome.is_success() {
            info!(invocation = %id, state = outcome.state(), elapsed_ms, "engine finished");
        } else {
            warn!(invocation = %id, state = outcome.state(), elapsed_ms, "engine failed");
        }

        Ok(outcome)
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::{RecommendationRequest, RecommendationType};
    use serde_json::json;

    fn shell_engine(script: &str, timeout: Duration) -> ProcessEngine {
        // "engine" becomes $0, the derived flags become $1..$n.
        ProcessEngine::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "engine".to_string()],
            timeout,
        )
    }

    fn popular(limit: u32) -> Invocation {
        Invocation::from(&RecommendationRequest::new(RecommendationType::Popular, limit))
    }

    #[tokio::test]
    async fn test_success_passthrough() {
        let engine = shell_engine(r#"printf '{"success":true,"items":[]}'"#, Duration::from_secs(10));
        let outcome = engine.run(&popular(5)).await.unwrap();
        assert_eq!(outcome.state(), "succeeded");
        assert_eq!(outcome.into_body(), json!({"success": true, "items": []}));
    }

    #[tokio::test]
    async fn test_receives_derived_args() {
        let engine = shell_engine(
            r#"printf '{"success":true,"args":"%s"}' "$*""#,
            Duration::from_secs(10),
        );
        let outcome = engine.run(&popular(5)).await.unwrap();
        assert_eq!(outcome.into_body()["args"], "--type popular --limit 5");
    }

    #[tokio::test]
    async fn test_non_json_output() {
        let engine = shell_engine("echo not-json", Duration::from_secs(10));
        let body = engine.run(&popular(5)).await.unwrap().into_body();
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse recommendation engine output: "));
    }

    #[tokio::test]
    async fn test_exit_code_and_stderr() {
        let engine = shell_engine("echo boom >&2; exit 2", Duration::from_secs(10));
        let body = engine.run(&popular(5)).await.unwrap().into_body();
        assert_eq!(
            body,
            json!({"success": false, "error": "Recommendation engine exited with code 2: boom"})
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let engine = ProcessEngine::new(
            "/nonexistent/reco-engine",
            Vec::new(),
            Duration::from_secs(10),
        );
        let outcome = engine.run(&popular(5)).await.unwrap();
        assert_eq!(outcome.state(), "failed_start");
        assert!(outcome.into_body()["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to start recommendation engine: "));
    }

    #[tokio::test]
    async fn test_timeout_kills_engine() {
        let engine = shell_engine("exec sleep 30", Duration::from_millis(200));
        let started = Instant::now();
        let outcome = engine.run(&popular(5)).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(
            outcome.into_body(),
            json!({"success": false, "error": "Recommendation engine timeout"})
        );
    }

    /// True while `/proc/<pid>` exists and the process is not a zombie.
    #[cfg(target_os = "linux")]
    fn process_running(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.trim_start().chars().next())
                .map_or(false, |state| state != 'Z' && state != 'X'),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_signals_engine_process() {
        let pid_file = std::env::temp_dir().join(format!("reco-engine-{}.pid", Uuid::new_v4()));
        let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
        let engine = shell_engine(&script, Duration::from_secs(1));

        let outcome = engine.run(&popular(5)).await.unwrap();
        assert_eq!(outcome.state(), "timed_out");

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let _ = std::fs::remove_file(&pid_file);

        let mut running = process_running(pid);
        for _ in 0..40 {
            if !running {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            running = process_running(pid);
        }
        assert!(!running, "engine pid {} still running after timeout", pid);
    }

    #[tokio::test]
    async fn test_large_output_does_not_block() {
        let engine = shell_engine(
            r#"i=0; printf '['; while [ $i -lt 20000 ]; do printf '%d,' $i; i=$((i+1)); done; printf '0]'; i=0; while [ $i -lt 2000 ]; do echo noise >&2; i=$((i+1)); done"#,
            Duration::from_secs(20),
        );
        let body = engine.run(&popular(5)).await.unwrap().into_body();
        assert_eq!(body.as_array().map(|a| a.len()), Some(20001));
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let engine = shell_engine(
            r#"printf '{"limit":"%s"}' "$4""#,
            Duration::from_secs(10),
        );
        let (first, second) = (popular(1), popular(2));
        let (a, b) = tokio::join!(engine.run(&first), engine.run(&second));
        assert_eq!(a.unwrap().into_body()["limit"], "1");
        assert_eq!(b.unwrap().into_body()["limit"], "2");
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            workdir: Some("/tmp".to_string()),
            ..EngineConfig::default()
        };
        let engine = ProcessEngine::from_config(&config);
        assert_eq!(engine.timeout(), Duration::from_secs(30));
        assert_eq!(engine.workdir, Some(PathBuf::from("/tmp")));
    }
}
