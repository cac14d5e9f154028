// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily send quota enforcement.

use chrono::NaiveDate;
use tracing::debug;

use mailforge_core::types::Plan;
use mailforge_core::{MailforgeError, UsageLedger};

/// Reject the dispatch when today's usage plus the requested batch would
/// exceed the plan's daily cap.
///
/// Failed deliveries count against the cap alongside sent ones: each was a
/// relay interaction. Runs before any campaign record exists.
pub async fn check_quota(
    ledger: &dyn UsageLedger,
    user_id: i64,
    date: NaiveDate,
    plan: Plan,
    requested: u32,
) -> Result<(), MailforgeError> {
    let usage = ledger.usage_for_day(user_id, date).await?;
    let used_today = usage.sent_count + usage.failed_count;
    let limit = plan.daily_limit();

    if used_today + requested > limit {
        return Err(MailforgeError::QuotaExceeded {
            limit,
            sent_today: used_today,
            requested,
            remaining: limit.saturating_sub(used_today),
        });
    }

    debug!(user_id, used_today, requested, limit, "quota check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailforge_core::types::{DailyUsage, DeliveryOutcome};

    struct FixedLedger {
        sent: u32,
        failed: u32,
    }

    #[async_trait]
    impl UsageLedger for FixedLedger {
        async fn usage_for_day(
            &self,
            user_id: i64,
            date: NaiveDate,
        ) -> Result<DailyUsage, MailforgeError> {
            Ok(DailyUsage {
                user_id,
                date,
                sent_count: self.sent,
                failed_count: self.failed,
            })
        }

        async fn record(
            &self,
            _user_id: i64,
            _date: NaiveDate,
            _outcome: DeliveryOutcome,
        ) -> Result<(), MailforgeError> {
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        chrono::Utc::now().date_naive()
    }

    #[tokio::test]
    async fn allows_batch_exactly_at_cap() {
        let ledger = FixedLedger { sent: 40, failed: 0 };
        check_quota(&ledger, 1, today(), Plan::Free, 10).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_batch_over_cap_with_remaining() {
        let ledger = FixedLedger { sent: 45, failed: 3 };
        let err = check_quota(&ledger, 1, today(), Plan::Free, 10)
            .await
            .unwrap_err();
        match err {
            MailforgeError::QuotaExceeded {
                limit,
                sent_today,
                requested,
                remaining,
            } => {
                assert_eq!((limit, sent_today, requested, remaining), (50, 48, 10, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn failed_deliveries_count_against_cap() {
        let ledger = FixedLedger { sent: 0, failed: 50 };
        let err = check_quota(&ledger, 1, today(), Plan::Free, 1).await.unwrap_err();
        assert!(matches!(err, MailforgeError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn premium_cap_is_two_thousand() {
        let ledger = FixedLedger {
            sent: 1999,
            failed: 0,
        };
        check_quota(&ledger, 1, today(), Plan::Premium, 1).await.unwrap();
    }
}
