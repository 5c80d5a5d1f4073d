pub mod bot;
pub mod credential;
pub mod grammar;
pub mod notes_client;
pub mod prompts;
pub mod runner;
pub mod tools;

pub use bot::{Bot, BotError, FrameSink, RunState, RunSummary};
pub use credential::{CredentialContext, CredentialScope};
pub use grammar::correct_grammar;
pub use notes_client::NotesClient;
pub use runner::{AgentDefinition, RunError, RunEvent, ToolHandler};
pub use tools::{NotesTool, NotesToolbox};
