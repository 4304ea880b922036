use chrono::{DateTime, Months, NaiveDate, Utc};
use garde::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::validation::{non_negative, not_blank};

/// Days before the end date during which a subscription is flagged as expiring.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_duration", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionDuration {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl SubscriptionDuration {
    pub fn months(self) -> u32 {
        match self {
            SubscriptionDuration::Monthly => 1,
            SubscriptionDuration::Quarterly => 3,
            SubscriptionDuration::Semiannual => 6,
            SubscriptionDuration::Annual => 12,
        }
    }

    /// Month arithmetic clamps to the last day of the target month (Jan 31 + 1 month = Feb 28).
    pub fn end_date(self, start: NaiveDate) -> Option<NaiveDate> {
        start.checked_add_months(Months::new(self.months()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_name: String,
    pub price: Decimal,
    pub duration: SubscriptionDuration,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub auto_renew: bool,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }

    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        (1..=EXPIRY_WARNING_DAYS).contains(&self.days_until_expiry(today))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub expiring_soon: bool,
}

impl SubscriptionView {
    pub fn new(subscription: Subscription, today: NaiveDate) -> Self {
        let expiring_soon = subscription.is_expiring_soon(today);
        Self {
            subscription,
            expiring_soon,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubscription {
    #[garde(custom(not_blank))]
    pub plan_name: String,
    #[garde(custom(non_negative))]
    pub price: Decimal,
    #[garde(skip)]
    pub duration: SubscriptionDuration,
    #[garde(skip)]
    #[serde(default)]
    pub auto_renew: bool,
}

/// What gets inserted: the request plus the computed period.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_name: String,
    pub price: Decimal,
    pub duration: SubscriptionDuration,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub auto_renew: bool,
}

impl NewSubscription {
    pub fn starting(user_id: Uuid, request: CreateSubscription, start_date: NaiveDate) -> Option<Self> {
        let end_date = request.duration.end_date(start_date)?;
        Some(Self {
            user_id,
            plan_name: request.plan_name.trim().to_string(),
            price: request.price,
            duration: request.duration,
            start_date,
            end_date,
            auto_renew: request.auto_renew,
        })
    }
}
