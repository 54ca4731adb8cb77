use crate::cli::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::core::contract::build_system_prompt;
use crate::core::pipeline::Pipeline;
use crate::core::session::{RecordedSession, replay};
use crate::observability::{Observer, create_observer};
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::Config;

/// Read a file, or stdin when `input` is `-`.
async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("read from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("read {input}"))
    }
}

async fn read_candidate(input: &str) -> Result<Value> {
    let text = read_input(input).await?;
    serde_json::from_str(&text).context("candidate is not valid JSON")
}

async fn read_session(input: &str) -> Result<RecordedSession> {
    let text = read_input(input).await?;
    RecordedSession::from_slice(text.as_bytes()).context("session is not a valid recording")
}

fn build_pipeline(config: &Config, pipeline: PipelineConfig) -> Pipeline {
    let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
    Pipeline::new(pipeline, observer)
}

fn render(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("serialize output")
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Finalize {
            input,
            no_score,
            pretty,
        } => {
            let candidate = read_candidate(&input).await?;
            let pipeline = build_pipeline(
                &config,
                PipelineConfig {
                    include_score: config.pipeline.include_score && !no_score,
                    ..config.pipeline.clone()
                },
            );
            let turn = pipeline.finalize(&candidate);
            println!("{}", render(&turn.to_value(), pretty)?);
            Ok(())
        }

        Commands::Score { input } => {
            let candidate = read_candidate(&input).await?;
            let pipeline = build_pipeline(
                &config,
                PipelineConfig {
                    include_score: true,
                    ..config.pipeline.clone()
                },
            );
            let turn = pipeline.finalize(&candidate);
            let score = serde_json::to_value(&turn.score).context("serialize score")?;
            println!("{}", render(&score, true)?);
            Ok(())
        }

        Commands::Replay {
            input,
            fail_fast,
            pretty,
        } => {
            let session = read_session(&input).await?;
            let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
            let pipeline = Arc::new(Pipeline::new(config.pipeline.clone(), Arc::clone(&observer)));
            let replayed = replay(session, pipeline, observer, fail_fast).await?;
            if replayed.failures() > 0 {
                warn!(failures = replayed.failures(), "some replayed turns failed");
            }
            println!("{}", render(&replayed.to_value(), pretty)?);
            Ok(())
        }

        Commands::Contract => {
            println!("{}", build_system_prompt());
            Ok(())
        }

        Commands::Serve { host, port } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting nutrilens gateway on {host} (random port)");
            } else {
                info!("Starting nutrilens gateway on {host}:{port}");
            }
            Ok(crate::transport::gateway::run_gateway(&host, port, Arc::clone(&config)).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn reads_candidates_from_files() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"uiComponents": []}}"#).unwrap();
        let value = read_candidate(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(value, serde_json::json!({"uiComponents": []}));
    }

    #[tokio::test]
    async fn invalid_candidate_files_are_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_candidate(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
        assert!(read_candidate("/definitely/missing.json").await.is_err());
    }

    #[tokio::test]
    async fn reads_recorded_sessions() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"turns": [{{"request": {{"userContext": "chips"}}, "response": []}}]}}"#
        )
        .unwrap();
        let session = read_session(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(session.turns.len(), 1);

        let mut bad = NamedTempFile::new().unwrap();
        write!(bad, r#"{{"turns": "none"}}"#).unwrap();
        let err = read_session(bad.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("not a valid recording"));
    }

    #[test]
    fn render_respects_pretty() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(render(&value, false).unwrap(), r#"{"a":1}"#);
        assert!(render(&value, true).unwrap().contains('\n'));
    }
}
