use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::conversation::Conversation;
use super::generator::{GenerationPrompt, Generator};
use super::request::AnalysisRequest;
use crate::core::pipeline::{FinalizedTurn, Pipeline};
use crate::error::{GeneratorError, RequestError};
use crate::observability::{Observer, ObserverEvent};

/// The only failure text a user ever sees.
pub const FAILURE_MESSAGE: &str = "Unable to complete analysis. Please try again.";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum AnalysisOutcome {
    Finalized(FinalizedTurn),
    /// The generator failed or returned nothing; the pipeline did not run.
    Failed(GeneratorError),
}

impl AnalysisOutcome {
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Finalized(_) => None,
            Self::Failed(_) => Some(FAILURE_MESSAGE),
        }
    }
}

/// Drives one turn: generator call, then the pipeline.
pub struct Analyzer {
    generator: Arc<dyn Generator>,
    pipeline: Arc<Pipeline>,
    observer: Arc<dyn Observer>,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(
        generator: Arc<dyn Generator>,
        pipeline: Arc<Pipeline>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            generator,
            pipeline,
            observer,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one analysis turn against `conversation`.
    ///
    /// The user turn is recorded before the generator is called. History
    /// sent upstream is the request's own when it carries one, otherwise the
    /// conversation's.
    pub async fn analyze(
        &self,
        conversation: &mut Conversation,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, RequestError> {
        request.validate()?;

        conversation.push_user(request.context(), request.image_base64.is_some());
        let history = if request.history.is_empty() {
            conversation.api_history()
        } else {
            request.history.clone()
        };
        let prompt = GenerationPrompt::new(&request, history);

        let candidate = match self.call_generator(&prompt).await {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::warn!(generator = self.generator.name(), error = %err, "generator call failed");
                self.observer.record_event(&ObserverEvent::UpstreamFailure {
                    message: err.to_string(),
                });
                return Ok(AnalysisOutcome::Failed(err));
            }
        };

        let turn = self.pipeline.finalize(&candidate);
        conversation.push_assistant(turn.sequence.clone());
        Ok(AnalysisOutcome::Finalized(turn))
    }

    async fn call_generator(&self, prompt: &GenerationPrompt) -> Result<Value, GeneratorError> {
        let candidate = tokio::time::timeout(self.timeout, self.generator.generate(prompt))
            .await
            .map_err(|_| GeneratorError::Timeout {
                secs: self.timeout.as_secs(),
            })??;
        if candidate.is_null() {
            return Err(GeneratorError::Empty {
                generator: self.generator.name().to_string(),
            });
        }
        Ok(candidate)
    }
}
