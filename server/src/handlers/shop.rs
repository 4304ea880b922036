use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use garde::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use crate::auth::ApprovedUser;
use crate::models::purchase::{CheckoutRequest, NewPurchase};
use crate::pricing::{
    self, OrderQuote, INSTALLMENT_INTEREST, INSTALLMENT_OPTIONS, MAX_TICKETS_PER_ORDER,
    MIN_TICKETS_PER_ORDER, TICKET_PRICE,
};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, success};

#[derive(Serialize)]
pub struct TicketOffer {
    pub unit_price: Decimal,
    pub unit_price_label: String,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub installment_options: [u32; 3],
    pub installment_interest: Decimal,
}

pub async fn offer(_user: ApprovedUser) -> Response {
    let offer = TicketOffer {
        unit_price: TICKET_PRICE,
        unit_price_label: pricing::format_brl(TICKET_PRICE),
        min_quantity: MIN_TICKETS_PER_ORDER,
        max_quantity: MAX_TICKETS_PER_ORDER,
        installment_options: INSTALLMENT_OPTIONS,
        installment_interest: INSTALLMENT_INTEREST,
    };
    success(offer, "Tickets available")
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default, deserialize_with = "selector_quantity")]
    pub quantity: Option<i64>,
}

/// Reads the selector value the way a form field is read: integers as-is, floats
/// truncated, strings by their leading digits. Anything else counts as absent.
fn selector_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(quantity_from_json))
}

fn quantity_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                // saturating cast
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Prices whatever the selector holds; out-of-range input is clamped, never rejected.
pub async fn quote(_user: ApprovedUser, AppJson(payload): AppJson<QuoteRequest>) -> Response {
    let quantity = pricing::clamp_quantity(payload.quantity.unwrap_or(1));
    let quote = OrderQuote::new(quantity);
    let message = format!(
        "Subtotal ({}x): {}",
        quote.quantity,
        pricing::format_brl(quote.subtotal)
    );
    success(quote, message)
}

pub async fn checkout(
    State(state): State<AppState>,
    ApprovedUser(current): ApprovedUser,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    let today = Utc::now().date_naive();
    let purchase = NewPurchase::from_checkout(current.id(), payload, today)?;
    let message = purchase.summary();
    let receipt = state.repos.purchases.create(purchase).await?;

    info!(
        purchase_id = %receipt.purchase.id,
        user_id = %current.id(),
        quantity = receipt.purchase.quantity,
        installments = receipt.purchase.installments,
        "Ticket purchase processed"
    );
    Ok(created(receipt, message))
}

pub async fn purchases(
    State(state): State<AppState>,
    ApprovedUser(current): ApprovedUser,
) -> AppResult<Response> {
    let purchases = state.repos.purchases.list_by_user(current.id()).await?;
    Ok(success(purchases, "Purchases loaded"))
}
