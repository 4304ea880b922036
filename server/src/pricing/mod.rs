//! Ticket pricing: unit price, quantity bounds and credit-card installments.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::error::{AppError, AppResult};

pub mod plans;

/// Price of a single ticket, in BRL.
pub const TICKET_PRICE: Decimal = Decimal::from_parts(9000, 0, 0, false, 2);

pub const MIN_TICKETS_PER_ORDER: u32 = 1;
pub const MAX_TICKETS_PER_ORDER: u32 = 100;

/// Flat surcharge applied to the whole order when paying in installments.
pub const INSTALLMENT_INTEREST: Decimal = Decimal::from_parts(6, 0, 0, false, 2);

/// Installment counts offered at checkout. `1` is the upfront payment.
pub const INSTALLMENT_OPTIONS: [u32; 3] = [1, 2, 3];

/// Clamps a requested quantity into the orderable range.
pub fn clamp_quantity(requested: i64) -> u32 {
    requested.clamp(
        i64::from(MIN_TICKETS_PER_ORDER),
        i64::from(MAX_TICKETS_PER_ORDER),
    ) as u32
}

pub fn validate_quantity(quantity: u32) -> AppResult<u32> {
    if (MIN_TICKETS_PER_ORDER..=MAX_TICKETS_PER_ORDER).contains(&quantity) {
        Ok(quantity)
    } else {
        Err(AppError::ValidationError(format!(
            "Select between {} and {} tickets",
            MIN_TICKETS_PER_ORDER, MAX_TICKETS_PER_ORDER
        )))
    }
}

pub fn order_total(quantity: u32) -> Decimal {
    Decimal::from(quantity) * TICKET_PRICE
}

/// Per-installment amount: the total plus the flat surcharge, split `installments` ways.
pub fn installment_amount(total: Decimal, installments: u32) -> Decimal {
    let with_interest = total * (Decimal::ONE + INSTALLMENT_INTEREST);
    with_interest / Decimal::from(installments.max(1))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOption {
    pub installments: u32,
    pub amount_per_installment: Decimal,
    pub total: Decimal,
    pub with_interest: bool,
}

impl PaymentOption {
    pub fn for_installments(total: Decimal, installments: u32) -> AppResult<Self> {
        match installments {
            1 => Ok(Self {
                installments: 1,
                amount_per_installment: total,
                total,
                with_interest: false,
            }),
            n if INSTALLMENT_OPTIONS.contains(&n) => {
                let per = installment_amount(total, n);
                Ok(Self {
                    installments: n,
                    amount_per_installment: per,
                    total: per * Decimal::from(n),
                    with_interest: true,
                })
            }
            n => Err(AppError::ValidationError(format!(
                "Installments must be one of {:?}, got {}",
                INSTALLMENT_OPTIONS, n
            ))),
        }
    }
}

pub fn payment_options(total: Decimal) -> Vec<PaymentOption> {
    INSTALLMENT_OPTIONS
        .iter()
        .filter_map(|&n| PaymentOption::for_installments(total, n).ok())
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderQuote {
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub payment_options: Vec<PaymentOption>,
}

impl OrderQuote {
    pub fn new(quantity: u32) -> Self {
        let total = order_total(quantity);
        Self {
            quantity,
            unit_price: TICKET_PRICE,
            subtotal: total,
            total,
            payment_options: payment_options(total),
        }
    }
}

/// Formats an amount the way receipts show it, e.g. `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{frac_part}")
}
