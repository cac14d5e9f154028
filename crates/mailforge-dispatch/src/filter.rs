// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient candidate filtering.
//!
//! Candidate lists arrive from callers or from the LLM address generator
//! and are never trusted: syntactically implausible entries are dropped
//! and duplicates collapse to their first occurrence, preserving order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9][A-Za-z0-9.-]*\.[A-Za-z]{2,}$").unwrap()
});

/// Filter candidates down to plausible, unique addresses.
///
/// Entries are trimmed first; dropped candidates are logged with the
/// reason. The surviving order matches the input order.
pub fn filter_recipients(candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        let trimmed = candidate.trim();
        if !ADDRESS_RE.is_match(trimmed) {
            debug!(candidate = %trimmed, "dropping implausible recipient");
            continue;
        }
        let normalized = trimmed.to_ascii_lowercase();
        if !seen.insert(normalized) {
            debug!(candidate = %trimmed, "dropping duplicate recipient");
            continue;
        }
        accepted.push(trimmed.to_string());
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_implausible_and_duplicate_candidates() {
        let input = owned(&["not-an-email", "ayush@x.com", "ayush@x.com"]);
        assert_eq!(filter_recipients(&input), vec!["ayush@x.com"]);
    }

    #[test]
    fn preserves_first_occurrence_order() {
        let input = owned(&[
            "b@example.com",
            "a@example.com",
            "B@example.com",
            "c@example.com",
        ]);
        assert_eq!(
            filter_recipients(&input),
            vec!["b@example.com", "a@example.com", "c@example.com"]
        );
    }

    #[test]
    fn trims_whitespace_before_matching() {
        let input = owned(&["  ada@acme.com  "]);
        assert_eq!(filter_recipients(&input), vec!["ada@acme.com"]);
    }

    #[test]
    fn rejects_missing_tld_and_bare_domain() {
        let input = owned(&["ada@localhost", "@acme.com", "ada@", "ada@acme.c"]);
        assert!(filter_recipients(&input).is_empty());
    }
}
