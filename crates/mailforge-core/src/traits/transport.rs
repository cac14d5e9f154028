// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for outbound mail relays.

use async_trait::async_trait;

use crate::error::MailforgeError;
use crate::types::{DeliveryReceipt, OutboundEmail};

/// Adapter over a single outbound mail relay (SMTP-like).
///
/// One instance is bound to one credential set and is exclusively owned by
/// the dispatch call that created it. The relay represents a single
/// rate-limited connection: callers must not hammer it concurrently, which
/// is why the dispatch engine sends strictly sequentially with a stagger.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Verify connectivity and credentials before first use.
    ///
    /// Performed once per dispatch call, not once per recipient. A failure
    /// signals a configuration error and aborts the whole batch.
    async fn verify(&self) -> Result<(), MailforgeError>;

    /// Hand one message to the relay.
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailforgeError>;

    /// The verified sender identity used as the `from` address.
    fn sender_address(&self) -> &str;
}
