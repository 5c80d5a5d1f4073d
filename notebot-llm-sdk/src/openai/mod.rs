pub mod client;
pub mod stream;
pub mod tools;
pub mod types;

pub use client::OpenAIClient;
pub use tools::OpenAIToolFormat;
pub use types::*;
