use axum::extract::State;
use axum::response::Response;
use garde::Validate;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::ticket::{CreateTicket, TicketStatus};
use crate::models::StatusUpdate;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppJson, AppPath};
use crate::utils::response::{created, success};

pub async fn list_tickets(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
) -> AppResult<Response> {
    let tickets = state.repos.tickets.list_by_creator(current.id()).await?;
    Ok(success(tickets, "Tickets loaded"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppJson(payload): AppJson<CreateTicket>,
) -> AppResult<Response> {
    payload.validate()?;

    let ticket = state
        .repos
        .tickets
        .create(current.id(), payload.normalized())
        .await?;
    tracing::info!(ticket_id = %ticket.id, event = %ticket.event_name, "Ticket created");

    Ok(created(ticket, "Ticket created; your event is now on sale"))
}

pub async fn update_ticket_status(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    AppPath(ticket_id): AppPath<Uuid>,
    AppJson(update): AppJson<StatusUpdate<TicketStatus>>,
) -> AppResult<Response> {
    let ticket = state
        .repos
        .tickets
        .set_status(ticket_id, current.id(), update.status)
        .await?;
    Ok(success(ticket, "Ticket status updated"))
}
