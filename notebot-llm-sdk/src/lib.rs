//! # Notebot LLM SDK
//!
//! Provider-agnostic chat completion types plus an OpenAI-compatible client
//! with streaming and function tools.
//!
//! ## Example
//!
//! ```rust,no_run
//! use notebot_llm_sdk::client::LlmClient;
//! use notebot_llm_sdk::openai::OpenAIClient;
//! use notebot_llm_sdk::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?.with_model("gpt-4o-mini-2024-07-18");
//!     let request = CompletionRequest::new(client.model_name(), vec![Message::user("Hello!")]);
//!     let response = client.complete(request).await?;
//!     println!("Response: {}", response.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod openai;
pub mod providers;
pub mod tools;
pub mod types;

pub use client::{LlmClient, StreamResult};
pub use error::LlmError;

#[cfg(test)]
mod tests {
    use crate::openai::OpenAIClient;
    use crate::types::{ContentBlock, Message, Role};

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAIClient::new("test-key");
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_client_creation_empty_key() {
        let client = OpenAIClient::new("");
        assert!(client.is_err());
    }

    #[test]
    fn test_message_creation() {
        let message = Message::text(Role::User, "Hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content.len(), 1);
        match &message.content[0] {
            ContentBlock::Text { text } => assert_eq!(text, "Hello"),
        }
    }
}
