use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::AdminPolicy;
use crate::models::purchase::AccountTotals;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The signed-in user as the dashboard sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub approved: bool,
    pub is_admin: bool,
}

impl SessionUser {
    pub fn new(user: &User, admin: &AdminPolicy) -> Self {
        let is_admin = admin.grants(&user.email);
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            approved: is_admin || user.approved,
            is_admin,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    pub search: Option<String>,
}

impl UserSearch {
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// Case-insensitive on email and name, plain substring on phone.
pub fn matches_search(user: &User, term: &str) -> bool {
    let needle = term.to_lowercase();
    user.email.to_lowercase().contains(&needle)
        || user.phone.contains(term)
        || user.full_name.to_lowercase().contains(&needle)
}

/// Row of the user-management table.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub approved: bool,
    pub registered_at: DateTime<Utc>,
    pub tickets_purchased: i64,
    pub total_paid: Decimal,
    pub total_pending: Decimal,
    pub days_overdue: i64,
    pub needs_collection: bool,
}

impl UserSummary {
    pub fn new(user: User, totals: AccountTotals) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            approved: user.approved,
            registered_at: user.created_at,
            tickets_purchased: totals.tickets_purchased,
            total_paid: totals.total_paid,
            total_pending: totals.total_pending,
            days_overdue: totals.days_overdue,
            needs_collection: totals.total_pending > Decimal::ZERO,
        }
    }
}
