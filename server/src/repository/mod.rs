//! Storage seams. Every table the application touches sits behind one of these traits;
//! `PgBackend` and `MemoryBackend` implement all of them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::access::{Access, AccessEntry, AccessStatus};
use crate::models::purchase::{AccountTotals, NewPurchase, Purchase, Receipt};
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionStatus};
use crate::models::ticket::{CreateTicket, Ticket, TicketStatus};
use crate::models::user::User;
use crate::utils::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn list(&self, search: Option<&str>) -> AppResult<Vec<User>>;
    async fn set_approved(&self, id: Uuid, approved: bool) -> AppResult<User>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, created_by: Uuid, ticket: CreateTicket) -> AppResult<Ticket>;
    // newest first
    async fn list_by_creator(&self, created_by: Uuid) -> AppResult<Vec<Ticket>>;
    async fn set_status(&self, id: Uuid, created_by: Uuid, status: TicketStatus) -> AppResult<Ticket>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, subscription: NewSubscription) -> AppResult<Subscription>;
    // newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;
    async fn set_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: SubscriptionStatus,
    ) -> AppResult<Subscription>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, ticket_id: Uuid) -> AppResult<Access>;
    // most recent access first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<AccessEntry>>;
    async fn set_status(&self, id: Uuid, user_id: Uuid, status: AccessStatus) -> AppResult<Access>;
    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn create(&self, purchase: NewPurchase) -> AppResult<Receipt>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Purchase>>;
    async fn totals_by_user(&self, today: NaiveDate) -> AppResult<HashMap<Uuid, AccountTotals>>;
    async fn count_pending_charges(&self) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub accesses: Arc<dyn AccessRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
}

impl Repositories {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository
            + TicketRepository
            + SubscriptionRepository
            + AccessRepository
            + PurchaseRepository
            + 'static,
    {
        Self {
            users: backend.clone(),
            tickets: backend.clone(),
            subscriptions: backend.clone(),
            accesses: backend.clone(),
            purchases: backend,
        }
    }
}
