use serde_json::{json, Value};

/// Terminal state of one engine run. Exactly one is produced per invocation.
#[derive(Debug)]
pub enum Outcome {
    /// Exit status zero and stdout parsed as JSON. Returned to the caller verbatim.
    Succeeded(Value),
    Failed(Failure),
}

/// Process-level failures. The `Display` text becomes the `error` field of
/// the response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("Failed to start recommendation engine: {0}")]
    Start(String),
    #[error("Recommendation engine timeout")]
    Timeout,
    #[error("Recommendation engine exited with code {}: {stderr}", exit_code_label(.code))]
    Exit { code: Option<i32>, stderr: String },
    #[error("Failed to parse recommendation engine output: {0}")]
    Parse(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "null".to_string(),
    }
}

impl Outcome {
    /// Resolve a finished process from its exit code and captured streams.
    pub fn from_exit(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        if code != Some(0) {
            let stderr = String::from_utf8_lossy(stderr).trim_end().to_string();
            return Outcome::Failed(Failure::Exit { code, stderr });
        }

        match serde_json::from_slice::<Value>(stdout) {
            Ok(value) => Outcome::Succeeded(value),
            Err(e) => Outcome::Failed(Failure::Parse(e.to_string())),
        }
    }

    /// Short name of the terminal state, for logs.
    pub fn state(&self) -> &'static str {
        match self {
            Outcome::Succeeded(_) => "succeeded",
            Outcome::Failed(Failure::Start(_)) => "failed_start",
            Outcome::Failed(Failure::Timeout) => "timed_out",
            Outcome::Failed(Failure::Exit { .. }) => "failed_exit",
            Outcome::Failed(Failure::Parse(_)) => "failed_parse",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn into_body(self) -> Value {
        match self {
            Outcome::Succeeded(value) => value,
            Outcome::Failed(failure) => json!({
                "success": false,
                "error": failure.to_string(),
            }),
        }
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Outcome::Failed(failure)
    }
}
