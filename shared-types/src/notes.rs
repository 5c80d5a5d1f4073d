use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NoteCreate {
    #[serde(default)]
    pub title: Option<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NoteOut {
    pub id: i64,
    pub title: String,
    pub note: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// One page of notes. `total` counts every note matching the filter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NoteResponse {
    pub data: Vec<NoteOut>,
    pub limit: u32,
    pub page: u32,
    pub total: i64,
}

/// Free text sent to and returned from the grammar endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NoteText {
    pub note: String,
}
