// src/handlers/mod.rs
use crate::config::ProjectionConfig;
use crate::models::Instrument;

pub mod error;
pub mod projection;

/// Shared, read-only server state: the canonical set built at startup and
/// the scenario loaded from the environment.
#[derive(Debug)]
pub struct AppState {
    pub instruments: Vec<Instrument>,
    pub config: ProjectionConfig,
}
