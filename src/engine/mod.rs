pub mod outcome;
pub mod process;
pub mod request;

pub use outcome::*;
pub use process::ProcessEngine;
pub use request::*;

use async_trait::async_trait;

/// Something that turns an [`Invocation`] into exactly one [`Outcome`].
///
/// `Ok` covers every terminal state of a run, including failures the
/// caller reports inside the response body. `Err` is reserved for
/// failures nobody expected, which surface as a 500.
#[async_trait]
pub trait RecommendationEngine: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error while collecting engine output: {0}")]
    Io(#[from] std::io::Error),
}
