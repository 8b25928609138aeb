// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::{ProjectionConfig, TenorRates};
pub use error::{ProjectionError, Result};
pub use models::{Instrument, RawSecurityRecord, Tenor, YearlyProjection};
