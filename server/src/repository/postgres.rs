use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AccessRepository, PurchaseRepository, SubscriptionRepository, TicketRepository, UserRepository,
};
use crate::models::access::{Access, AccessEntry, AccessStatus};
use crate::models::purchase::{AccountTotals, NewPurchase, PendingCharge, Purchase, Receipt};
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionStatus};
use crate::models::ticket::{CreateTicket, Ticket, TicketStatus};
use crate::models::user::User;
use crate::utils::error::{AppError, AppResult};

const USER_COLUMNS: &str = "id, email, full_name, phone, approved, created_at, updated_at";
const TICKET_COLUMNS: &str = "id, created_by, event_name, description, event_date, venue, price, \
     quantity_available, quantity_sold, status, created_at, updated_at";
const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_name, price, duration, start_date, \
     end_date, auto_renew, status, created_at";
const ACCESS_COLUMNS: &str = "id, user_id, ticket_id, accessed_at, status";
const PURCHASE_COLUMNS: &str = "id, user_id, quantity, unit_price, total, payment_method, \
     installments, amount_charged, approval_code, created_at";
const CHARGE_COLUMNS: &str = "id, user_id, purchase_id, amount, due_date, paid, created_at";

/// `%term%` for LIKE, with the wildcard characters in `term` escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_rows(&self, sql: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl UserRepository for PgBackend {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self, search: Option<&str>) -> AppResult<Vec<User>> {
        let users = match search {
            Some(term) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     WHERE email ILIKE $1 OR full_name ILIKE $1 OR phone LIKE $2 \
                     ORDER BY created_at DESC"
                ))
                .bind(like_pattern(&term.to_lowercase()))
                .bind(like_pattern(term))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET approved = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{id}' was not found")))
    }

    async fn count(&self) -> AppResult<i64> {
        self.count_rows("SELECT COUNT(*) FROM users").await
    }
}

#[async_trait]
impl TicketRepository for PgBackend {
    async fn create(&self, created_by: Uuid, ticket: CreateTicket) -> AppResult<Ticket> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets \
             (id, created_by, event_name, description, event_date, venue, price, quantity_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {TICKET_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(created_by)
        .bind(&ticket.event_name)
        .bind(&ticket.description)
        .bind(ticket.event_date)
        .bind(&ticket.venue)
        .bind(ticket.price)
        .bind(ticket.quantity_available)
        .fetch_one(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn list_by_creator(&self, created_by: Uuid) -> AppResult<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn set_status(&self, id: Uuid, created_by: Uuid, status: TicketStatus) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET status = $3, updated_at = now() \
             WHERE id = $1 AND created_by = $2 RETURNING {TICKET_COLUMNS}"
        ))
        .bind(id)
        .bind(created_by)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket '{id}' was not found")))
    }

    async fn count(&self) -> AppResult<i64> {
        self.count_rows("SELECT COUNT(*) FROM tickets").await
    }
}

#[async_trait]
impl SubscriptionRepository for PgBackend {
    async fn create(&self, subscription: NewSubscription) -> AppResult<Subscription> {
        let created = sqlx::query_as::<_, Subscription>(&format!(
            "INSERT INTO subscriptions \
             (id, user_id, plan_name, price, duration, start_date, end_date, auto_renew) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(subscription.user_id)
        .bind(&subscription.plan_name)
        .bind(subscription.price)
        .bind(subscription.duration)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.auto_renew)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions)
    }

    async fn set_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: SubscriptionStatus,
    ) -> AppResult<Subscription> {
        sqlx::query_as::<_, Subscription>(&format!(
            "UPDATE subscriptions SET status = $3 WHERE id = $1 AND user_id = $2 \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subscription '{id}' was not found")))
    }

    async fn count(&self) -> AppResult<i64> {
        self.count_rows("SELECT COUNT(*) FROM subscriptions").await
    }
}

#[async_trait]
impl AccessRepository for PgBackend {
    async fn create(&self, user_id: Uuid, ticket_id: Uuid) -> AppResult<Access> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tickets WHERE id = $1)")
            .bind(ticket_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Ticket '{ticket_id}' was not found")));
        }

        let access = sqlx::query_as::<_, Access>(&format!(
            "INSERT INTO accesses (id, user_id, ticket_id) VALUES ($1, $2, $3) RETURNING {ACCESS_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(ticket_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(access)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<AccessEntry>> {
        let entries = sqlx::query_as::<_, AccessEntry>(
            "SELECT a.id, a.ticket_id, a.accessed_at, a.status, t.event_name, t.venue \
             FROM accesses a JOIN tickets t ON t.id = a.ticket_id \
             WHERE a.user_id = $1 ORDER BY a.accessed_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn set_status(&self, id: Uuid, user_id: Uuid, status: AccessStatus) -> AppResult<Access> {
        sqlx::query_as::<_, Access>(&format!(
            "UPDATE accesses SET status = $3 WHERE id = $1 AND user_id = $2 RETURNING {ACCESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Access '{id}' was not found")))
    }

    async fn count(&self) -> AppResult<i64> {
        self.count_rows("SELECT COUNT(*) FROM accesses").await
    }
}

#[async_trait]
impl PurchaseRepository for PgBackend {
    async fn create(&self, purchase: NewPurchase) -> AppResult<Receipt> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Purchase>(&format!(
            "INSERT INTO purchases \
             (id, user_id, quantity, unit_price, total, payment_method, installments, amount_charged, approval_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PURCHASE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(purchase.user_id)
        .bind(purchase.quantity as i32)
        .bind(purchase.unit_price)
        .bind(purchase.total)
        .bind(purchase.payment_method)
        .bind(purchase.installments as i32)
        .bind(purchase.amount_charged)
        .bind(&purchase.approval_code)
        .fetch_one(&mut *tx)
        .await?;

        let mut pending_charges = Vec::with_capacity(purchase.charges.len());
        for charge in &purchase.charges {
            let row = sqlx::query_as::<_, PendingCharge>(&format!(
                "INSERT INTO pending_charges (id, user_id, purchase_id, amount, due_date) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {CHARGE_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(created.user_id)
            .bind(created.id)
            .bind(charge.amount)
            .bind(charge.due_date)
            .fetch_one(&mut *tx)
            .await?;
            pending_charges.push(row);
        }

        tx.commit().await?;
        Ok(Receipt {
            purchase: created,
            pending_charges,
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }

    async fn totals_by_user(&self, today: NaiveDate) -> AppResult<HashMap<Uuid, AccountTotals>> {
        let charged: Vec<(Uuid, i64, Decimal)> = sqlx::query_as(
            "SELECT user_id, COALESCE(SUM(quantity), 0)::BIGINT, COALESCE(SUM(amount_charged), 0) \
             FROM purchases GROUP BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let pending: Vec<(Uuid, Decimal, i64)> = sqlx::query_as(
            "SELECT user_id, COALESCE(SUM(amount), 0), \
             COALESCE(MAX(GREATEST($1::DATE - due_date, 0)), 0)::BIGINT \
             FROM pending_charges WHERE NOT paid GROUP BY user_id",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        let mut totals: HashMap<Uuid, AccountTotals> = HashMap::new();
        for (user_id, tickets, amount) in charged {
            let entry = totals.entry(user_id).or_default();
            entry.tickets_purchased = tickets;
            entry.total_paid += amount;
        }
        for (user_id, amount, days_overdue) in pending {
            let entry = totals.entry(user_id).or_default();
            entry.total_pending = amount;
            entry.total_paid -= amount;
            entry.days_overdue = days_overdue;
        }
        Ok(totals)
    }

    async fn count_pending_charges(&self) -> AppResult<i64> {
        self.count_rows("SELECT COUNT(*) FROM pending_charges WHERE NOT paid").await
    }
}
