use chrono::{DateTime, Months, NaiveDate, Utc};
use garde::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pricing::{self, PaymentOption};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub installments: i32,
    pub amount_charged: Decimal,
    pub approval_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An installment still owed on a credit-card purchase.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingCharge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purchase_id: Uuid,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[garde(range(min = 1, max = 100))]
    pub quantity: u32,
    #[garde(skip)]
    pub payment_method: Option<PaymentMethod>,
    #[garde(skip)]
    #[serde(default)]
    pub installments: Option<u32>,
    #[garde(skip)]
    #[serde(default)]
    pub approval_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCharge {
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub installments: u32,
    pub amount_charged: Decimal,
    pub approval_code: Option<String>,
    pub charges: Vec<ScheduledCharge>,
}

impl NewPurchase {
    /// Prices a checkout. Pix is settled upfront; on a credit card the first installment
    /// is charged now and each later one falls due a month after the previous.
    pub fn from_checkout(user_id: Uuid, request: CheckoutRequest, today: NaiveDate) -> AppResult<Self> {
        let quantity = pricing::validate_quantity(request.quantity)?;
        let method = request.payment_method.ok_or_else(|| {
            AppError::ValidationError("Select a payment method".to_string())
        })?;

        let installments = match (method, request.installments) {
            (PaymentMethod::Pix, None | Some(1)) => 1,
            (PaymentMethod::Pix, Some(_)) => {
                return Err(AppError::ValidationError(
                    "Pix payments cannot be split into installments".to_string(),
                ))
            }
            (PaymentMethod::CreditCard, n) => n.unwrap_or(1),
        };

        let total = pricing::order_total(quantity);
        let option = PaymentOption::for_installments(total, installments)?;

        let charges = (1..option.installments)
            .map(|k| -> AppResult<ScheduledCharge> {
                let due_date = today.checked_add_months(Months::new(k)).ok_or_else(|| {
                    AppError::InternalServerError("Installment due date out of range".to_string())
                })?;
                Ok(ScheduledCharge {
                    amount: option.amount_per_installment,
                    due_date,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            user_id,
            quantity,
            unit_price: pricing::TICKET_PRICE,
            total,
            payment_method: method,
            installments: option.installments,
            amount_charged: option.total,
            approval_code: request
                .approval_code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            charges,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ticket(s) - Total: {}",
            self.quantity,
            pricing::format_brl(self.total)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub purchase: Purchase,
    pub pending_charges: Vec<PendingCharge>,
}

/// Per-user financial position shown in user management.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountTotals {
    pub tickets_purchased: i64,
    pub total_paid: Decimal,
    pub total_pending: Decimal,
    pub days_overdue: i64,
}

impl AccountTotals {
    /// Folds purchases and the charges still unpaid into totals as of `today`.
    pub fn tally<'a>(
        purchases: impl IntoIterator<Item = &'a Purchase>,
        unpaid: impl IntoIterator<Item = &'a PendingCharge>,
        today: NaiveDate,
    ) -> Self {
        let mut totals = AccountTotals::default();
        let mut charged = Decimal::ZERO;
        for purchase in purchases {
            totals.tickets_purchased += i64::from(purchase.quantity);
            charged += purchase.amount_charged;
        }
        for charge in unpaid.into_iter().filter(|c| !c.paid) {
            totals.total_pending += charge.amount;
            let overdue = (today - charge.due_date).num_days();
            totals.days_overdue = totals.days_overdue.max(overdue);
        }
        totals.total_paid = charged - totals.total_pending;
        totals
    }
}
