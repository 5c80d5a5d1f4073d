use crate::prompts::grammar_prompt;
use notebot_llm_sdk::client::LlmClient;
use notebot_llm_sdk::error::LlmError;
use notebot_llm_sdk::types::{CompletionRequest, Message};

/// Single non-streaming model call that returns a corrected version of `text`
pub async fn correct_grammar(
    llm: &dyn LlmClient,
    model: &str,
    text: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest::new(model, vec![Message::user(grammar_prompt(text))]);
    let response = llm.complete(request).await?;
    tracing::debug!(
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "Grammar correction finished"
    );
    Ok(response.text())
}
