// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams of the dispatch core.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so
//! the dispatch engine can run against a lettre SMTP transport in
//! production and in-memory fakes in tests.

pub mod generator;
pub mod store;
pub mod transport;

pub use generator::{AddressGenerator, ContentGenerator, ContentParams};
pub use store::{CampaignStore, UsageLedger};
pub use transport::MailTransport;
