//! Use-case services above the scheduler and stores.
//!
//! # Responsibility
//! - Keep host layers (CLI, boot hook) decoupled from storage details.
//! - Compose store I/O with scheduler calls in one place.

pub mod history_service;
pub mod settings_service;
