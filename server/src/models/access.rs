use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    Used,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Access {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticket_id: Uuid,
    pub accessed_at: DateTime<Utc>,
    pub status: AccessStatus,
}

/// An access joined with the event it grants entry to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessEntry {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub accessed_at: DateTime<Utc>,
    pub status: AccessStatus,
    pub event_name: String,
    pub venue: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccess {
    pub ticket_id: Uuid,
}
