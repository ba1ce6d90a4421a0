//! The OTP store: at most one pending challenge per identity.
//!
//! Redemption checks run in a fixed order (existence → expiry → match) so a
//! caller always sees the same error under compound failure, and the
//! check-and-delete on success happens atomically under the lock so one
//! code can never be redeemed twice.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use otpd_common::OtpError;

use super::generator::generate_code;

/// A pending challenge for one identity
#[derive(Debug, Clone)]
struct Challenge {
    /// The code the caller must submit
    code: String,
    /// Fixed at issue time; no sliding expiry, no renewal
    expires_at: DateTime<Utc>,
}

/// In-memory challenge store, keyed by email address.
///
/// Owned by `AppState` and constructed at startup; nothing survives a
/// restart. All operations are O(1) and never touch I/O under the lock.
pub struct OtpStore {
    entries: Mutex<HashMap<String, Challenge>>,
    /// Challenge validity
    ttl: Duration,
    /// Statistics
    stats: StoreCounters,
}

/// Runtime counters
#[derive(Default)]
struct StoreCounters {
    /// Challenges issued (including overwrites)
    issued: AtomicU64,
    /// Successful redemptions
    redeemed: AtomicU64,
    /// Entries removed because they were observed expired
    evicted: AtomicU64,
    /// Redeem attempts with a wrong code
    mismatches: AtomicU64,
}

/// Snapshot of store statistics
#[derive(Clone, Debug, Serialize)]
pub struct StoreStats {
    pub pending: usize,
    pub issued: u64,
    pub redeemed: u64,
    pub evicted: u64,
    pub mismatches: u64,
}

impl OtpStore {
    /// Create an empty store with the given challenge TTL in seconds
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs as i64),
            stats: StoreCounters::default(),
        }
    }

    /// Issue a fresh challenge for `identity`, replacing any existing one.
    ///
    /// Returns the generated code; delivering it is the caller's concern.
    /// The identity is not validated here. Never fails.
    pub async fn issue(&self, identity: &str) -> String {
        self.issue_at(identity, Utc::now()).await
    }

    async fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> String {
        let code = generate_code();
        let challenge = Challenge {
            code: code.clone(),
            expires_at: now + self.ttl,
        };

        self.entries
            .lock()
            .await
            .insert(identity.to_string(), challenge);
        self.stats.issued.fetch_add(1, Ordering::Relaxed);

        code
    }

    /// Redeem `submitted` against the pending challenge for `identity`.
    ///
    /// Check order is fixed: existence, then expiry, then match. An entry
    /// observed expired is evicted even though the attempt fails; a
    /// mismatch leaves the entry in place so the caller may retry until
    /// expiry. A matched entry is removed before the lock is released.
    pub async fn redeem(&self, identity: &str, submitted: &str) -> Result<(), OtpError> {
        self.redeem_at(identity, submitted, Utc::now()).await
    }

    async fn redeem_at(
        &self,
        identity: &str,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OtpError> {
        let mut entries = self.entries.lock().await;

        let challenge = entries.get(identity).ok_or(OtpError::NotFound)?;

        // Valid up to and including expires_at itself
        if now > challenge.expires_at {
            entries.remove(identity);
            self.stats.evicted.fetch_add(1, Ordering::Relaxed);
            return Err(OtpError::Expired);
        }

        if challenge.code != submitted {
            self.stats.mismatches.fetch_add(1, Ordering::Relaxed);
            return Err(OtpError::Mismatch);
        }

        entries.remove(identity);
        self.stats.redeemed.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// Remove every entry past its deadline. Returns the eviction count.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, challenge| now <= challenge.expires_at);
        let removed = before - entries.len();
        self.stats
            .evicted
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of pending challenges
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Get statistics snapshot
    pub async fn stats(&self) -> StoreStats {
        StoreStats {
            pending: self.entries.lock().await.len(),
            issued: self.stats.issued.load(Ordering::Relaxed),
            redeemed: self.stats.redeemed.load(Ordering::Relaxed),
            evicted: self.stats.evicted.load(Ordering::Relaxed),
            mismatches: self.stats.mismatches.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL_SECS: u64 = 300;

    fn store() -> OtpStore {
        OtpStore::new(TTL_SECS)
    }

    /// Issue until the new code differs from `other` (collision odds are
    /// 1 in 900000 per draw, so this terminates immediately in practice)
    async fn issue_distinct(store: &OtpStore, identity: &str, other: &str) -> String {
        loop {
            let code = store.issue(identity).await;
            if code != other {
                return code;
            }
        }
    }

    #[tokio::test]
    async fn test_redeem_unknown_identity_is_not_found() {
        let store = store();
        let result = store.redeem("a@x.com", "123456").await;
        assert!(matches!(result, Err(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_issue_then_redeem_then_not_found() {
        let store = store();

        let code = store.issue("a@x.com").await;
        assert!(store.redeem("a@x.com", &code).await.is_ok());
        assert!(store.is_empty().await);

        // Single-use: same correct code again
        let result = store.redeem("a@x.com", &code).await;
        assert!(matches!(result, Err(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_reissue_overwrites_prior_challenge() {
        let store = store();

        let first = store.issue("b@x.com").await;
        let second = issue_distinct(&store, "b@x.com", &first).await;
        assert_eq!(store.len().await, 1);

        let result = store.redeem("b@x.com", &first).await;
        assert!(matches!(result, Err(OtpError::Mismatch)));

        assert!(store.redeem("b@x.com", &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_mismatch_retains_entry_for_retry() {
        let store = store();

        let code = store.issue("a@x.com").await;
        let wrong = if code == "999999" { "100000" } else { "999999" };

        let result = store.redeem("a@x.com", wrong).await;
        assert!(matches!(result, Err(OtpError::Mismatch)));
        assert_eq!(store.len().await, 1);

        assert!(store.redeem("a@x.com", &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_redeem_reports_expired_and_evicts() {
        let store = store();
        let t0 = Utc::now();

        let code = store.issue_at("c@x.com", t0).await;

        let late = t0 + Duration::seconds(TTL_SECS as i64 + 1);
        let result = store.redeem_at("c@x.com", &code, late).await;
        assert!(matches!(result, Err(OtpError::Expired)));

        // Lazy eviction: the entry is gone now
        assert!(store.is_empty().await);
        let result = store.redeem_at("c@x.com", &code, late).await;
        assert!(matches!(result, Err(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_strict() {
        let store = store();
        let t0 = Utc::now();

        // Still valid at exactly the deadline
        let code = store.issue_at("a@x.com", t0).await;
        let deadline = t0 + Duration::seconds(TTL_SECS as i64);
        assert!(store.redeem_at("a@x.com", &code, deadline).await.is_ok());

        // One second past the deadline is expired
        let code = store.issue_at("a@x.com", t0).await;
        let result = store
            .redeem_at("a@x.com", &code, deadline + Duration::seconds(1))
            .await;
        assert!(matches!(result, Err(OtpError::Expired)));
    }

    #[tokio::test]
    async fn test_expired_with_wrong_code_still_reports_expired() {
        let store = store();
        let t0 = Utc::now();

        let code = store.issue_at("a@x.com", t0).await;
        let wrong = if code == "999999" { "100000" } else { "999999" };

        let late = t0 + Duration::seconds(TTL_SECS as i64 + 1);
        let result = store.redeem_at("a@x.com", wrong, late).await;
        assert!(matches!(result, Err(OtpError::Expired)));
    }

    #[tokio::test]
    async fn test_concurrent_redeems_spend_the_code_once() {
        let store = store();
        let code = store.issue("a@x.com").await;

        let (first, second) = tokio::join!(
            store.redeem("a@x.com", &code),
            store.redeem("a@x.com", &code),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        // The loser observed the entry already consumed
        let loser = if first.is_ok() { second } else { first };
        assert!(matches!(loser, Err(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired_entries() {
        let store = store();
        let t0 = Utc::now();

        store.issue_at("old@x.com", t0 - Duration::seconds(600)).await;
        store.issue_at("fresh@x.com", t0).await;

        let removed = store.purge_expired_at(t0).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);

        // The surviving entry is the fresh one
        let result = store.redeem_at("old@x.com", "123456", t0).await;
        assert!(matches!(result, Err(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_stats_track_outcomes() {
        let store = store();

        let code = store.issue("a@x.com").await;
        let wrong = if code == "999999" { "100000" } else { "999999" };
        let _ = store.redeem("a@x.com", wrong).await;
        let _ = store.redeem("a@x.com", &code).await;

        let stats = store.stats().await;
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.redeemed, 1);
        assert_eq!(stats.pending, 0);
    }
}
