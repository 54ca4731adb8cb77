//! Offline replay of a recorded session. Each recorded request goes through
//! the analyzer with the recorded generator response standing in for a live
//! generator, so a session can be re-finalized after the pipeline changes.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use super::analyzer::{AnalysisOutcome, Analyzer, FAILURE_MESSAGE};
use super::conversation::Conversation;
use super::generator::ScriptedGenerator;
use super::request::AnalysisRequest;
use crate::core::pipeline::Pipeline;
use crate::error::{LensError, RequestError};
use crate::observability::Observer;

/// One recorded turn. A `null` or missing response is a generator that
/// returned nothing.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedTurn {
    pub request: Value,
    #[serde(default)]
    pub response: Value,
}

/// `{"turns": [{"request": {...}, "response": <candidate>}]}`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedSession {
    pub turns: Vec<RecordedTurn>,
}

impl RecordedSession {
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        serde_json::from_slice(body).map_err(|e| RequestError::Body(e.to_string()))
    }
}

#[derive(Debug)]
pub struct Replay {
    pub conversation: Conversation,
    pub outcomes: Vec<AnalysisOutcome>,
}

impl Replay {
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, AnalysisOutcome::Failed(_)))
            .count()
    }

    /// Rendered as the user would have seen it: finalized turns, or the
    /// single failure message.
    pub fn to_value(&self) -> Value {
        let turns: Vec<Value> = self
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                AnalysisOutcome::Finalized(turn) => turn.to_value(),
                AnalysisOutcome::Failed(_) => json!({ "error": FAILURE_MESSAGE }),
            })
            .collect();
        json!({
            "conversation": self.conversation.id(),
            "turns": turns,
        })
    }
}

/// Replay `session` on a fresh conversation.
///
/// Every request is validated before the first turn runs. With `fail_fast`
/// the first generator failure ends the replay as an error.
pub async fn replay(
    session: RecordedSession,
    pipeline: Arc<Pipeline>,
    observer: Arc<dyn Observer>,
    fail_fast: bool,
) -> crate::error::Result<Replay> {
    let requests = session
        .turns
        .iter()
        .map(|turn| AnalysisRequest::parse(turn.request.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let generator = ScriptedGenerator::new(session.turns.into_iter().map(|turn| Ok(turn.response)));
    let analyzer = Analyzer::new(Arc::new(generator), pipeline, observer);

    let mut conversation = Conversation::new();
    let mut outcomes = Vec::with_capacity(requests.len());
    for request in requests {
        let outcome = analyzer.analyze(&mut conversation, request).await?;
        if fail_fast && let AnalysisOutcome::Failed(err) = &outcome {
            return Err(LensError::Generator(err.clone()));
        }
        outcomes.push(outcome);
    }

    tracing::debug!(
        conversation = %conversation.id(),
        turns = outcomes.len(),
        "session replayed"
    );
    Ok(Replay {
        conversation,
        outcomes,
    })
}
