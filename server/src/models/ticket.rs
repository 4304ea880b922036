use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::validation::{non_negative, not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    Inactive,
    SoldOut,
}

/// A batch of tickets for one event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub created_by: Uuid,
    pub event_name: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub venue: String,
    pub price: Decimal,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicket {
    #[garde(custom(not_blank))]
    pub event_name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: Option<String>,
    #[garde(skip)]
    pub event_date: NaiveDate,
    #[garde(custom(not_blank))]
    pub venue: String,
    #[garde(custom(non_negative))]
    pub price: Decimal,
    #[garde(range(min = 1))]
    pub quantity_available: i32,
}

impl CreateTicket {
    /// Trims the free-text fields; an empty description is stored as absent.
    pub fn normalized(self) -> Self {
        Self {
            event_name: self.event_name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            venue: self.venue.trim().to_string(),
            ..self
        }
    }
}
