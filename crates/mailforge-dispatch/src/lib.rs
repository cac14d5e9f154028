// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential campaign dispatch for Mailforge.
//!
//! The engine processes one campaign per call: quota check, one transport
//! verification, campaign creation, then a strictly ordered send loop with
//! a fixed stagger between recipients and per-recipient retries. The
//! [`DispatchService`] wraps the engine with an explicit start/stop
//! lifecycle and the generation collaborators.

pub mod engine;
pub mod filter;
pub mod progress;
pub mod quota;
pub mod service;

pub use engine::{DispatchEngine, DispatchOutcome, DispatchRequest, TransportFactory};
pub use progress::ProgressReporter;
pub use service::DispatchService;
