use serde::Deserialize;

pub mod access;
pub mod purchase;
pub mod stats;
pub mod subscription;
pub mod ticket;
pub mod user;

/// Body of the status/approval toggle endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}
