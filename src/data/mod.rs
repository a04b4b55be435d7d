use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric id of a status column, as assigned by the server.
pub type StatusId = i64;

/// Numeric id of a sprint (milestone). `None` scope means the backlog.
pub type SprintId = i64;

/// A kanban column for work items. Immutable once fetched; the board uses
/// its id as the grouping key for stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
    /// Hex color the server assigns to the column, e.g. "#70728F"
    pub color: String,
    /// Position of the column on the board (server-defined)
    pub order: i64,
    pub is_closed: bool,
}

/// A work item tracked under a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    /// The "#123" number shown next to the subject
    pub reference: i64,
    pub subject: String,
    pub status_id: StatusId,
    pub assignee: Option<String>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Short display form, e.g. "#42 Fix login redirect"
    pub fn label(&self) -> String {
        format!("#{} {}", self.reference, self.subject)
    }
}
