use axum::response::Response;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::ApprovedUser;
use crate::pricing::plans::{self, PlanCard, PlanGroup};
use crate::pricing::{format_brl, TICKET_PRICE};
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::AppJson;
use crate::utils::response::success;

#[derive(Serialize)]
pub struct PlanCatalogue {
    pub ticket_price: Decimal,
    pub groups: Vec<PlanGroup>,
    pub most_popular: PlanCard,
    pub best_value: PlanCard,
}

pub async fn list_plans(_user: ApprovedUser) -> Response {
    let catalogue = PlanCatalogue {
        ticket_price: TICKET_PRICE,
        groups: plans::catalogue(),
        most_popular: PlanCard::from(plans::most_popular()),
        best_value: PlanCard::from(plans::best_value()),
    };
    success(catalogue, "Subscription plans loaded")
}

#[derive(Debug, Deserialize)]
pub struct PlanSelection {
    pub tickets: u32,
    pub months: u32,
}

pub async fn select_plan(
    _user: ApprovedUser,
    AppJson(selection): AppJson<PlanSelection>,
) -> AppResult<Response> {
    let plan = plans::find(selection.tickets, selection.months).ok_or_else(|| {
        AppError::NotFound(format!(
            "No plan with {} tickets for {} months",
            selection.tickets, selection.months
        ))
    })?;

    let message = format!(
        "{} tickets for {} months - {}",
        plan.tickets,
        plan.months,
        format_brl(plan.total_price())
    );
    Ok(success(PlanCard::from(plan), message))
}
