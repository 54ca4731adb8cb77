use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nutrilens::core::directive::DirectiveKind;
use nutrilens::core::pipeline::Pipeline;
use nutrilens::core::session::{
    AnalysisOutcome, AnalysisRequest, Analyzer, Conversation, FAILURE_MESSAGE, GenerationPrompt,
    Generator, HistoryMessage, IMAGE_ONLY_PROMPT, Role, ScriptedGenerator, Turn,
};
use nutrilens::error::{GeneratorError, RequestError};
use nutrilens::observability::{NoopObserver, Observer, ObserverEvent, ObserverMetric};
use serde_json::{Value, json};

const IMAGE: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

fn analyzer_with(generator: Arc<dyn Generator>) -> Analyzer {
    Analyzer::new(
        generator,
        Arc::new(Pipeline::with_defaults()),
        Arc::new(NoopObserver),
    )
}

fn chips_candidate() -> Value {
    json!({"uiComponents": [
        {"component": "HealthBadge", "props": {"message": "Gluten free"}},
        {"component": "IngredientTable", "props": {"items": [
            {"label": "Sodium", "value": "900mg", "status": "bad"}
        ]}},
        {"component": "SmartFollowUp", "props": {"questions": ["Is there a low-salt version?"]}}
    ]})
}

mod multi_turn {
    use super::*;

    #[tokio::test]
    async fn second_turn_sends_stringified_first_turn() {
        let generator = Arc::new(ScriptedGenerator::new([
            Ok(chips_candidate()),
            Ok(json!([{"component": "SmartFollowUp", "props": {"questions": ["Anything else?"]}}])),
        ]));
        let analyzer = analyzer_with(generator.clone());
        let mut conversation = Conversation::new();

        let first = AnalysisRequest {
            image_base64: Some(IMAGE.into()),
            user_context: None,
            history: Vec::new(),
        };
        let outcome = analyzer.analyze(&mut conversation, first).await.unwrap();
        let AnalysisOutcome::Finalized(turn) = outcome else {
            panic!("expected a finalized turn");
        };
        assert_eq!(turn.sequence.as_slice()[0].kind(), DirectiveKind::RiskWarning);
        assert!(!turn.sequence.contains(DirectiveKind::PositiveBadge));

        analyzer
            .analyze(&mut conversation, AnalysisRequest::from_context("Is it keto?"))
            .await
            .unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].context, "Context: General health check");
        assert_eq!(prompts[0].image_base64.as_deref(), Some(IMAGE));
        assert_eq!(prompts[1].context, "Context: Is it keto?");
        assert!(prompts[1].image_base64.is_none());

        let history = &prompts[1].history;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text(), IMAGE_ONLY_PROMPT);
        assert_eq!(history[1].role, Role::Assistant);
        assert!(history[1].content.is_string());
        assert!(history[1].text().contains("WarningCard"));
        assert_eq!(history[2].text(), "Is it keto?");
    }

    #[tokio::test]
    async fn request_history_overrides_conversation_history() {
        let generator = Arc::new(ScriptedGenerator::new([Ok(json!([]))]));
        let analyzer = analyzer_with(generator.clone());
        let mut conversation = Conversation::new();
        conversation.push_user(Some("earlier question"), false);

        let request = AnalysisRequest {
            image_base64: None,
            user_context: Some("follow up".into()),
            history: vec![HistoryMessage {
                role: Role::Assistant,
                content: json!([{"component": "HealthBadge", "props": {"message": "Vegan"}}]),
            }],
        };
        analyzer.analyze(&mut conversation, request).await.unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts[0].history.len(), 1);
        assert!(prompts[0].history[0].text().starts_with("[{"));
    }

    #[tokio::test]
    async fn transcript_collects_every_assistant_turn() {
        let generator = Arc::new(ScriptedGenerator::new([
            Ok(json!([{"component": "HealthBadge", "props": {"message": "Vegan"}}])),
            Ok(json!([{"component": "SmartFollowUp", "props": {"questions": ["Why?"]}}])),
        ]));
        let analyzer = analyzer_with(generator);
        let mut conversation = Conversation::new();
        for text in ["first", "second"] {
            analyzer
                .analyze(&mut conversation, AnalysisRequest::from_context(text))
                .await
                .unwrap();
        }

        assert_eq!(conversation.len(), 4);
        assert!(matches!(conversation.turns()[2], Turn::User { ref text, .. } if text == "second"));
        assert_eq!(
            conversation.transcript().kinds(),
            vec![DirectiveKind::PositiveBadge, DirectiveKind::FollowUpQuestions]
        );
    }
}

mod upstream_failures {
    use super::*;

    #[derive(Default)]
    struct FailureLog {
        messages: Mutex<Vec<String>>,
    }

    impl Observer for FailureLog {
        fn record_event(&self, event: &ObserverEvent) {
            if let ObserverEvent::UpstreamFailure { message } = event {
                self.messages.lock().unwrap().push(message.clone());
            }
        }

        fn record_metric(&self, _metric: &ObserverMetric) {}

        fn name(&self) -> &str {
            "failure-log"
        }
    }

    struct SlowGenerator;

    impl Generator for SlowGenerator {
        fn name(&self) -> &str {
            "slow"
        }

        fn generate<'a>(
            &'a self,
            _prompt: &'a GenerationPrompt,
        ) -> Pin<Box<dyn Future<Output = Result<Value, GeneratorError>> + Send + 'a>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(json!([]))
            })
        }
    }

    #[tokio::test]
    async fn generator_error_yields_the_single_failure_message() {
        let log = Arc::new(FailureLog::default());
        let analyzer = Analyzer::new(
            Arc::new(ScriptedGenerator::new([Err(GeneratorError::Request {
                generator: "scripted".into(),
                message: "503 Service Unavailable".into(),
            })])),
            Arc::new(Pipeline::with_defaults()),
            log.clone(),
        );
        let mut conversation = Conversation::new();

        let outcome = analyzer
            .analyze(&mut conversation, AnalysisRequest::from_context("chips"))
            .await
            .unwrap();

        assert_eq!(outcome.user_message(), Some(FAILURE_MESSAGE));
        assert_eq!(conversation.len(), 1);
        let messages = log.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("503"));
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let analyzer = analyzer_with(Arc::new(SlowGenerator)).with_timeout(Duration::from_millis(20));
        let mut conversation = Conversation::new();

        let outcome = analyzer
            .analyze(&mut conversation, AnalysisRequest::from_context("chips"))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AnalysisOutcome::Failed(GeneratorError::Timeout { .. })
        ));
        assert_eq!(outcome.user_message(), Some(FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn exhausted_script_is_a_failure_not_a_panic() {
        let analyzer = analyzer_with(Arc::new(ScriptedGenerator::new([])));
        let mut conversation = Conversation::new();
        let outcome = analyzer
            .analyze(&mut conversation, AnalysisRequest::from_context("chips"))
            .await
            .unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Failed(GeneratorError::Request { .. })));
    }
}

mod replays {
    use super::*;
    use nutrilens::core::session::{RecordedSession, replay};

    #[tokio::test]
    async fn recorded_session_is_refinalized() {
        let recording = json!({"turns": [
            {"request": {"imageBase64": IMAGE}, "response": chips_candidate()},
            {"request": {"userContext": "Is it keto?"}, "response": null}
        ]});
        let session = RecordedSession::from_slice(recording.to_string().as_bytes()).unwrap();

        let replayed = replay(
            session,
            Arc::new(Pipeline::with_defaults()),
            Arc::new(NoopObserver),
            false,
        )
        .await
        .unwrap();

        assert_eq!(replayed.failures(), 1);
        let value = replayed.to_value();
        assert_eq!(value["turns"][0]["uiComponents"][0]["component"], "WarningCard");
        assert_eq!(value["turns"][1]["error"], FAILURE_MESSAGE);
    }
}

mod requests {
    use super::*;

    #[test]
    fn body_parsing_validates() {
        let ok = AnalysisRequest::parse(json!({
            "userContext": "I am diabetic",
            "history": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();
        assert_eq!(ok.context(), Some("I am diabetic"));
        assert_eq!(ok.history.len(), 1);

        assert!(matches!(
            AnalysisRequest::parse(json!(["not", "an", "object"])),
            Err(RequestError::Body(_))
        ));
        assert_eq!(
            AnalysisRequest::parse(json!({"userContext": "   "})),
            Err(RequestError::NothingToAnalyze)
        );
        assert!(matches!(
            AnalysisRequest::parse(json!({"imageBase64": "abc"})),
            Err(RequestError::ImageTooShort { .. })
        ));
    }

    #[tokio::test]
    async fn rejected_requests_leave_the_conversation_untouched() {
        let generator = Arc::new(ScriptedGenerator::new([Ok(json!([]))]));
        let analyzer = analyzer_with(generator.clone());
        let mut conversation = Conversation::new();
        let request = AnalysisRequest {
            image_base64: Some("short".into()),
            user_context: None,
            history: Vec::new(),
        };

        let err = analyzer.analyze(&mut conversation, request).await.unwrap_err();

        assert!(matches!(err, RequestError::ImageTooShort { .. }));
        assert!(conversation.is_empty());
        assert!(generator.prompts().is_empty());
    }
}
