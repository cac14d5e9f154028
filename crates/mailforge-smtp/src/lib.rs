// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery transport for the Mailforge dispatch engine.
//!
//! Implements [`MailTransport`] over `lettre`'s async SMTP client with
//! STARTTLS, bounded verify and send timeouts, and relay credentials taken
//! from the validated configuration layer.

pub mod transport;

pub use transport::SmtpMailTransport;
