use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

use super::request::{AnalysisRequest, HistoryMessage};
use crate::core::contract::build_system_prompt;
use crate::error::GeneratorError;

/// Everything a generator needs for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPrompt {
    pub system: String,
    pub history: Vec<HistoryMessage>,
    /// `Context: ...` line for the current turn.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl GenerationPrompt {
    pub fn new(request: &AnalysisRequest, history: Vec<HistoryMessage>) -> Self {
        Self {
            system: build_system_prompt(),
            history,
            context: request.context_line(),
            image_base64: request.image_base64.clone(),
        }
    }
}

/// External structured-output generator.
///
/// Returns the raw candidate exactly as produced; shape is not trusted.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        prompt: &'a GenerationPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<Value, GeneratorError>> + Send + 'a>>;
}

/// Replays canned candidates in order. Once exhausted every call fails.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Value, GeneratorError>>>,
    prompts: Mutex<Vec<GenerationPrompt>>,
}

impl ScriptedGenerator {
    pub fn new(responses: impl IntoIterator<Item = Result<Value, GeneratorError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a GenerationPrompt,
    ) -> Pin<Box<dyn Future<Output = Result<Value, GeneratorError>> + Send + 'a>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        let name = self.name().to_string();
        Box::pin(async move {
            next.unwrap_or(Err(GeneratorError::Request {
                generator: name,
                message: "script exhausted".into(),
            }))
        })
    }
}
