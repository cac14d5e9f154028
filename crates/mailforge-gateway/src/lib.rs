// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API surface for the Mailforge dispatch engine.
//!
//! Exposes campaign creation (synchronous-completion), status polling, and
//! a liveness endpoint over axum. The gateway owns no business logic: every
//! handler delegates to the injected [`DispatchService`].
//!
//! [`DispatchService`]: mailforge_dispatch::DispatchService

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState};
