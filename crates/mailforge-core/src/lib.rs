// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mailforge outreach platform.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Mailforge workspace. The dispatch
//! engine, storage layer, transport adapter, and HTTP gateway all build on
//! the contracts defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MailforgeError;
pub use types::{
    Campaign, CampaignId, CampaignStatus, DailyUsage, DeliveryOutcome, DeliveryReceipt,
    DispatchResult, MailBody, OutboundEmail, Plan, ProgressView,
};

// Re-export the seam traits at crate root.
pub use traits::{AddressGenerator, CampaignStore, ContentGenerator, MailTransport, UsageLedger};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = MailforgeError::Config("test".into());
        let _quota = MailforgeError::QuotaExceeded {
            limit: 50,
            sent_today: 0,
            requested: 10,
            remaining: 50,
        };
        let _transport = MailforgeError::Transport {
            message: "test".into(),
            source: None,
        };
        let _generation = MailforgeError::Generation {
            message: "test".into(),
            source: None,
        };
        let _storage = MailforgeError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _timeout = MailforgeError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _internal = MailforgeError::Internal("test".into());
    }

    #[test]
    fn seam_traits_are_object_safe() {
        // The dispatch engine holds these behind Arc<dyn ...>; this won't
        // compile if object safety regresses.
        fn _transport(_: &dyn MailTransport) {}
        fn _store(_: &dyn CampaignStore) {}
        fn _ledger(_: &dyn UsageLedger) {}
        fn _addresses(_: &dyn AddressGenerator) {}
        fn _content(_: &dyn ContentGenerator) {}
    }
}
