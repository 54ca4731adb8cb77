use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::request::{HistoryMessage, Role};
use crate::core::directive::{Directive, DirectiveSequence};

/// Text recorded for a user turn that carried only an image.
pub const IMAGE_ONLY_PROMPT: &str = "Analyze this image";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    User { text: String, has_image: bool },
    Assistant { sequence: DirectiveSequence },
}

/// Ordered turns of one analysis session.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    id: Uuid,
    started_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, text: Option<&str>, has_image: bool) {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(IMAGE_ONLY_PROMPT);
        self.turns.push(Turn::User {
            text: text.to_string(),
            has_image,
        });
    }

    pub fn push_assistant(&mut self, sequence: DirectiveSequence) {
        self.turns.push(Turn::Assistant { sequence });
    }

    /// History as sent upstream: user text as-is, assistant turns as the
    /// JSON text of what was rendered. Images are never resent.
    pub fn api_history(&self) -> Vec<HistoryMessage> {
        self.turns
            .iter()
            .map(|turn| match turn {
                Turn::User { text, .. } => HistoryMessage {
                    role: Role::User,
                    content: Value::String(text.clone()),
                },
                Turn::Assistant { sequence } => HistoryMessage {
                    role: Role::Assistant,
                    content: Value::String(
                        serde_json::to_string(sequence.as_slice()).unwrap_or_default(),
                    ),
                },
            })
            .collect()
    }

    /// Every finalized directive, in turn order.
    pub fn transcript(&self) -> DirectiveSequence {
        let directives: Vec<Directive> = self
            .turns
            .iter()
            .filter_map(|turn| match turn {
                Turn::Assistant { sequence } => Some(sequence.iter().cloned()),
                Turn::User { .. } => None,
            })
            .flatten()
            .collect();
        DirectiveSequence::new(directives)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
