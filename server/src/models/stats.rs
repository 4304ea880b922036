use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_tickets: i64,
    pub total_subscriptions: i64,
    pub total_accesses: i64,
    pub total_pending_charges: i64,
}
