// src/services/mod.rs
pub mod buckets;
pub mod dedup;
pub mod ingest;
pub mod projection;
pub mod simulation;
