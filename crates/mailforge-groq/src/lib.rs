// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq chat-completion client and the LLM-backed email generators.
//!
//! Talks to Groq's OpenAI-compatible `/chat/completions` endpoint and
//! implements the [`AddressGenerator`] and [`ContentGenerator`] contracts
//! from `mailforge-core`.
//!
//! [`AddressGenerator`]: mailforge_core::traits::AddressGenerator
//! [`ContentGenerator`]: mailforge_core::traits::ContentGenerator

pub mod client;
pub mod generators;
pub mod types;

pub use client::GroqClient;
pub use generators::{GroqAddressGenerator, GroqContentGenerator};
