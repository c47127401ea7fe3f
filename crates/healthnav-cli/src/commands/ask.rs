//! Ask command - a one-shot question to the health assistant.

use clap::Args;
use tracing::info;

use healthnav_core::{build_chat_prompt, Assistant};

use super::Context;
use crate::assistant::GeminiAssistant;

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Question to ask
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    /// Do not attach the saved profile's conditions and goals
    #[arg(long)]
    no_context: bool,
}

pub async fn run(args: AskArgs, ctx: &Context) -> anyhow::Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        anyhow::bail!("Please enter a question.");
    }

    let context = if args.no_context {
        None
    } else {
        ctx.user_context()?
    };
    let prompt = build_chat_prompt(&question, context.as_ref());
    info!("Asking {}", ctx.config.assistant.model);

    let assistant = GeminiAssistant::from_config(&ctx.config.assistant)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let reply = assistant
        .ask(&prompt)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{}", reply.trim());
    Ok(())
}
