use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::config::RateLimitPolicy;

/// Fixed-window request counter keyed by client identity.
///
/// The in-memory implementation only covers a single process; a multi
/// instance deployment plugs in a shared counter behind the same trait.
pub trait RateLimiter: Send + Sync + 'static {
    /// Records one request for `identity` and reports whether it is allowed.
    fn allow(
        &self,
        identity: &str,
        policy: RateLimitPolicy,
    ) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryRateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// [`RateLimiter::allow`] evaluated at an explicit instant.
    ///
    /// A window that has passed is replaced wholesale with a fresh one
    /// holding this request; windows never slide.
    pub async fn allow_at(
        &self,
        identity: &str,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> bool {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get_mut(identity) {
            if now <= entry.reset_at {
                if entry.count >= policy.max_requests {
                    return false;
                }
                entry.count += 1;
                return true;
            }
        }

        // windows that have passed are dropped so unseen identities don't pile up
        entries.retain(|_, entry| now <= entry.reset_at);
        entries.insert(
            identity.to_string(),
            RateLimitEntry {
                count: 1,
                reset_at: now + policy.window,
            },
        );
        true
    }

    pub async fn entry(&self, identity: &str) -> Option<RateLimitEntry> {
        self.entries.lock().await.get(identity).copied()
    }

    /// Number of tracked identities.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl RateLimiter for InMemoryRateLimiter {
    async fn allow(&self, identity: &str, policy: RateLimitPolicy) -> bool {
        self.allow_at(identity, policy, Utc::now()).await
    }
}
