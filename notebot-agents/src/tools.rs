use crate::credential::CredentialContext;
use crate::notes_client::NotesClient;
use crate::runner::ToolHandler;
use async_trait::async_trait;
use notebot_llm_sdk::tools::{Tool, ToolCall};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub const MAX_PAGE_SIZE: i64 = 10;

/// Arguments of `get_note`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetNoteArgs {
    /// The ID of the note to retrieve
    pub note_id: i64,
}

/// Arguments of `get_notes`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetNotesArgs {
    /// Maximum number of notes to return (max 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 10))]
    pub limit: i64,
    /// Page number of results, starting at 1
    #[serde(default = "default_page")]
    #[schemars(range(min = 1))]
    pub page: i64,
    /// Optional search query matched against note titles
    #[serde(default)]
    pub search: String,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

fn default_page() -> i64 {
    1
}

/// Arguments of `create_note`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateNoteArgs {
    /// Title of the new note
    pub title: String,
    /// Body of the new note
    pub note: String,
}

/// Tools the notes agent can call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesTool {
    GetNote,
    GetNotes,
    CreateNote,
}

impl NotesTool {
    pub const ALL: [NotesTool; 3] = [NotesTool::GetNote, NotesTool::GetNotes, NotesTool::CreateNote];

    /// Returns the tool name as exposed to the model
    pub fn name(&self) -> &'static str {
        match self {
            NotesTool::GetNote => "get_note",
            NotesTool::GetNotes => "get_notes",
            NotesTool::CreateNote => "create_note",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn to_tool_definition(&self) -> Tool {
        match self {
            NotesTool::GetNote => {
                Tool::function::<GetNoteArgs>(self.name(), "Get a note by its ID.")
            }
            NotesTool::GetNotes => Tool::function::<GetNotesArgs>(
                self.name(),
                "Get a list of notes with pagination and optional search.",
            ),
            NotesTool::CreateNote => {
                Tool::function::<CreateNoteArgs>(self.name(), "Create a new note.")
            }
        }
    }
}

/// Exposes [`NotesClient`] operations as model tools.
///
/// The bearer token is read from the run's [`CredentialContext`] at call time.
/// Results are handed back unchanged; problems with the call itself become
/// error envelopes.
#[derive(Clone)]
pub struct NotesToolbox {
    client: Arc<NotesClient>,
    credentials: CredentialContext,
}

impl NotesToolbox {
    pub fn new(client: Arc<NotesClient>, credentials: CredentialContext) -> Self {
        Self {
            client,
            credentials,
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Option<String>, String> {
        let tool = NotesTool::from_name(call.name())
            .ok_or_else(|| format!("Unknown tool: {}", call.name()))?;
        let token = self
            .credentials
            .get()
            .ok_or_else(|| "No credential available for this session".to_string())?;

        let output = match tool {
            NotesTool::GetNote => {
                let args: GetNoteArgs = call.parse_arguments().map_err(|e| e.to_string())?;
                self.client.fetch_note(&token, args.note_id).await
            }
            NotesTool::GetNotes => {
                let args: GetNotesArgs = call.parse_arguments().map_err(|e| e.to_string())?;
                if !(1..=MAX_PAGE_SIZE).contains(&args.limit) {
                    return Err(format!("limit must be between 1 and {}", MAX_PAGE_SIZE));
                }
                if args.page < 1 {
                    return Err("page must be at least 1".to_string());
                }
                self.client
                    .list_notes(&token, args.limit, args.page, &args.search)
                    .await
            }
            NotesTool::CreateNote => {
                let args: CreateNoteArgs = call.parse_arguments().map_err(|e| e.to_string())?;
                self.client.create_note(&token, &args.title, &args.note).await
            }
        };
        Ok(output)
    }
}

#[async_trait]
impl ToolHandler for NotesToolbox {
    fn definitions(&self) -> Vec<Tool> {
        NotesTool::ALL
            .iter()
            .map(NotesTool::to_tool_definition)
            .collect()
    }

    async fn call(&self, call: &ToolCall) -> String {
        match self.dispatch(call).await {
            Ok(Some(output)) => output,
            Ok(None) => "null".to_string(),
            Err(message) => {
                debug!(tool = call.name(), error = %message, "Rejected tool call");
                json!({ "error": message }).to_string()
            }
        }
    }
}
