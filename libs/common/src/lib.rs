//! Common library for the chess platform
//!
//! This crate provides shared functionality used across the platform
//! services: the persistence error taxonomy, per-key locking and tracing
//! setup.

pub mod error;
pub mod locks;
pub mod telemetry;
