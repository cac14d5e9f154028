// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per storage concern.

pub mod campaigns;
pub mod jobs;
pub mod usage;
