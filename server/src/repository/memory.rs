use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccessRepository, PurchaseRepository, SubscriptionRepository, TicketRepository, UserRepository,
};
use crate::models::access::{Access, AccessEntry, AccessStatus};
use crate::models::purchase::{AccountTotals, NewPurchase, PendingCharge, Purchase, Receipt};
use crate::models::subscription::{NewSubscription, Subscription, SubscriptionStatus};
use crate::models::ticket::{CreateTicket, Ticket, TicketStatus};
use crate::models::user::{matches_search, User};
use crate::utils::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tickets: Vec<Ticket>,
    subscriptions: Vec<Subscription>,
    accesses: Vec<Access>,
    purchases: Vec<Purchase>,
    pending_charges: Vec<PendingCharge>,
}

/// Process-local backend used by the mock mode and the tests.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                users,
                ..Tables::default()
            }),
        }
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[async_trait]
impl UserRepository for MemoryBackend {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, search: Option<&str>) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| search.map_or(true, |term| matches_search(u, term)))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User '{id}' was not found")))?;
        user.approved = approved;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(count(self.tables.read().await.users.len()))
    }
}

#[async_trait]
impl TicketRepository for MemoryBackend {
    async fn create(&self, created_by: Uuid, ticket: CreateTicket) -> AppResult<Ticket> {
        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            created_by,
            event_name: ticket.event_name,
            description: ticket.description,
            event_date: ticket.event_date,
            venue: ticket.venue,
            price: ticket.price,
            quantity_available: ticket.quantity_available,
            quantity_sold: 0,
            status: TicketStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn list_by_creator(&self, created_by: Uuid) -> AppResult<Vec<Ticket>> {
        let tables = self.tables.read().await;
        let mut tickets: Vec<Ticket> = tables
            .tickets
            .iter()
            .filter(|t| t.created_by == created_by)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn set_status(&self, id: Uuid, created_by: Uuid, status: TicketStatus) -> AppResult<Ticket> {
        let mut tables = self.tables.write().await;
        let ticket = tables
            .tickets
            .iter_mut()
            .find(|t| t.id == id && t.created_by == created_by)
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{id}' was not found")))?;
        ticket.status = status;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(count(self.tables.read().await.tickets.len()))
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryBackend {
    async fn create(&self, subscription: NewSubscription) -> AppResult<Subscription> {
        let created = Subscription {
            id: Uuid::new_v4(),
            user_id: subscription.user_id,
            plan_name: subscription.plan_name,
            price: subscription.price,
            duration: subscription.duration,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            auto_renew: subscription.auto_renew,
            status: SubscriptionStatus::Active,
            created_at: Utc::now(),
        };
        self.tables.write().await.subscriptions.push(created.clone());
        Ok(created)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let tables = self.tables.read().await;
        let mut subscriptions: Vec<Subscription> = tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subscriptions)
    }

    async fn set_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: SubscriptionStatus,
    ) -> AppResult<Subscription> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id && s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Subscription '{id}' was not found")))?;
        subscription.status = status;
        Ok(subscription.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(count(self.tables.read().await.subscriptions.len()))
    }
}

#[async_trait]
impl AccessRepository for MemoryBackend {
    async fn create(&self, user_id: Uuid, ticket_id: Uuid) -> AppResult<Access> {
        let mut tables = self.tables.write().await;
        if !tables.tickets.iter().any(|t| t.id == ticket_id) {
            return Err(AppError::NotFound(format!("Ticket '{ticket_id}' was not found")));
        }
        let access = Access {
            id: Uuid::new_v4(),
            user_id,
            ticket_id,
            accessed_at: Utc::now(),
            status: AccessStatus::Pending,
        };
        tables.accesses.push(access.clone());
        Ok(access)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<AccessEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<AccessEntry> = tables
            .accesses
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let ticket = tables.tickets.iter().find(|t| t.id == a.ticket_id)?;
                Some(AccessEntry {
                    id: a.id,
                    ticket_id: a.ticket_id,
                    accessed_at: a.accessed_at,
                    status: a.status,
                    event_name: ticket.event_name.clone(),
                    venue: ticket.venue.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at));
        Ok(entries)
    }

    async fn set_status(&self, id: Uuid, user_id: Uuid, status: AccessStatus) -> AppResult<Access> {
        let mut tables = self.tables.write().await;
        let access = tables
            .accesses
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Access '{id}' was not found")))?;
        access.status = status;
        Ok(access.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(count(self.tables.read().await.accesses.len()))
    }
}

#[async_trait]
impl PurchaseRepository for MemoryBackend {
    async fn create(&self, purchase: NewPurchase) -> AppResult<Receipt> {
        let now = Utc::now();
        let created = Purchase {
            id: Uuid::new_v4(),
            user_id: purchase.user_id,
            quantity: i32::try_from(purchase.quantity)
                .map_err(|_| AppError::ValidationError("Quantity out of range".to_string()))?,
            unit_price: purchase.unit_price,
            total: purchase.total,
            payment_method: purchase.payment_method,
            installments: i32::try_from(purchase.installments)
                .map_err(|_| AppError::ValidationError("Installments out of range".to_string()))?,
            amount_charged: purchase.amount_charged,
            approval_code: purchase.approval_code,
            created_at: now,
        };
        let pending_charges: Vec<PendingCharge> = purchase
            .charges
            .into_iter()
            .map(|charge| PendingCharge {
                id: Uuid::new_v4(),
                user_id: created.user_id,
                purchase_id: created.id,
                amount: charge.amount,
                due_date: charge.due_date,
                paid: false,
                created_at: now,
            })
            .collect();

        let mut tables = self.tables.write().await;
        tables.purchases.push(created.clone());
        tables.pending_charges.extend(pending_charges.iter().cloned());

        Ok(Receipt {
            purchase: created,
            pending_charges,
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Purchase>> {
        let tables = self.tables.read().await;
        let mut purchases: Vec<Purchase> = tables
            .purchases
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(purchases)
    }

    async fn totals_by_user(&self, today: NaiveDate) -> AppResult<HashMap<Uuid, AccountTotals>> {
        let tables = self.tables.read().await;
        let mut purchases_by_user: HashMap<Uuid, Vec<&Purchase>> = HashMap::new();
        for purchase in &tables.purchases {
            purchases_by_user.entry(purchase.user_id).or_default().push(purchase);
        }
        let mut charges_by_user: HashMap<Uuid, Vec<&PendingCharge>> = HashMap::new();
        for charge in &tables.pending_charges {
            charges_by_user.entry(charge.user_id).or_default().push(charge);
        }

        let user_ids: HashSet<Uuid> = purchases_by_user
            .keys()
            .chain(charges_by_user.keys())
            .copied()
            .collect();

        Ok(user_ids
            .into_iter()
            .map(|user_id| {
                let purchases = purchases_by_user.get(&user_id).into_iter().flatten().copied();
                let charges = charges_by_user.get(&user_id).into_iter().flatten().copied();
                (user_id, AccountTotals::tally(purchases, charges, today))
            })
            .collect())
    }

    async fn count_pending_charges(&self) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(count(tables.pending_charges.iter().filter(|c| !c.paid).count()))
    }
}
