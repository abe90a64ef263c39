//! Scheduling and reminder-lifecycle engine.
//!
//! # Responsibility
//! - `window`: pure next-fire math.
//! - `state`: per-category state machine.
//! - `scheduler`: timer ownership and transition application.
//! - `dispatcher`: user action and fire routing, log requests.
//! - `runner`, `thread_runner`, `observer`: platform seams and events.

pub mod dispatcher;
pub mod observer;
pub mod runner;
pub mod scheduler;
pub mod state;
pub mod thread_runner;
pub mod window;
