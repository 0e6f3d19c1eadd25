//! Local runner: builds the pipeline from the environment and answers one
//! event passed on the command line.
//!
//! ```bash
//! OPENAI_API_KEY=sk-... ragpost '{"question": "What is task decomposition?"}'
//! # or as a bare question:
//! OPENAI_API_KEY=sk-... ragpost What is task decomposition?
//! ```

use ragpost::config::PipelineConfig;
use ragpost::handler::{self, QuestionEvent};
use ragpost::pipeline::RagPipeline;
use ragpost::types::RagError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), RagError> {
    init_tracing();

    let event = parse_event(std::env::args().skip(1).collect());
    let config = PipelineConfig::from_env()?;
    let pipeline = RagPipeline::from_config(config)?;

    let response = handler::handle(&pipeline, event).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Accepts either a JSON event (`{"question": "..."}`) or a bare question.
fn parse_event(args: Vec<String>) -> QuestionEvent {
    let raw = args.join(" ");
    if raw.trim().is_empty() {
        return QuestionEvent::default();
    }
    serde_json::from_str(&raw).unwrap_or(QuestionEvent::new(raw))
}
