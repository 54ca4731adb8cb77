//! Conversation state and the seam to the external generator.

mod analyzer;
mod conversation;
mod generator;
mod replay;
mod request;

pub use analyzer::{AnalysisOutcome, Analyzer, FAILURE_MESSAGE};
pub use conversation::{Conversation, IMAGE_ONLY_PROMPT, Turn};
pub use generator::{GenerationPrompt, Generator, ScriptedGenerator};
pub use replay::{RecordedSession, RecordedTurn, Replay, replay};
pub use request::{AnalysisRequest, HistoryMessage, MIN_IMAGE_CHARS, Role};
