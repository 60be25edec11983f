use crate::llm::{LlmClient, LlmError};

/// Instruction sent with every chunk.
pub fn build_prompt(chunk: &str, description: &str) -> String {
    format!(
        "You are tasked with extracting specific information from the following text content: {chunk}. \
         Follow these instructions:\n\n\
         1. Extract only the information matching: {description}.\n\
         2. No extra explanations.\n\
         3. Return empty string '' if no match."
    )
}

/// Ask the model about each chunk in order and join the replies with `\n`.
///
/// A blank description matches nothing, so no requests are made.
pub async fn extract_from_chunks(
    llm: &dyn LlmClient,
    chunks: &[String],
    description: &str,
) -> Result<String, LlmError> {
    if description.trim().is_empty() {
        return Ok(String::new());
    }

    let total = chunks.len();
    let mut results = Vec::with_capacity(total);
    for (i, chunk) in chunks.iter().enumerate() {
        let response = llm.complete(&build_prompt(chunk, description)).await?;
        tracing::info!("Parsed batch: {}/{} ({})", i + 1, total, llm.model_name());
        results.push(response);
    }

    Ok(results.join("\n"))
}
